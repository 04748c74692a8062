use crudkit::{Form, FormMode, FormPage, FormPhase, FormValues, ResourceClient, SubmitOutcome};

use crate::support::{queries, toaster, widget_schema, Status};

#[tokio::test]
async fn short_name_never_reaches_the_client() {
    let (widgets, client) = queries();
    let toasts = toaster();
    let mut page = FormPage::new("New widget", FormMode::Create, widget_schema(), widgets, toasts.clone());
    page.set("name", "Wi");
    page.set("status", "active");

    let outcome = page.submit().await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation to fail");
    };
    assert_eq!(errors.get("name"), Some("Name must be at least 3 characters"));
    assert_eq!(page.form().phase(), FormPhase::Editing);
    assert_eq!(client.list().await.unwrap().len(), 3);
    assert!(toasts.active().is_empty());
}

#[tokio::test]
async fn valid_form_creates_widget() {
    let (widgets, client) = queries();
    let mut page = FormPage::new("New widget", FormMode::Create, widget_schema(), widgets.clone(), toaster());
    page.set("name", "Widget");
    page.set("status", "active");

    let SubmitOutcome::Submitted(widget) = page.submit().await else {
        panic!("expected the widget to be created");
    };
    assert_eq!(widget.name, "Widget");
    assert_eq!(widget.status, Status::Active);
    assert_eq!(widget.description, None);
    assert_eq!(client.get(&widget.id).await.unwrap(), widget);
    assert!(widgets.list().await.data.unwrap().contains(&widget));
}

#[tokio::test]
async fn edit_form_round_trip() {
    let (widgets, client) = queries();
    let mut page = FormPage::new("Edit widget", FormMode::Edit("2".into()), widget_schema(), widgets, toaster());
    page.load().await.unwrap();
    assert_eq!(page.form().value("name"), Some("Gear"));
    assert_eq!(page.form().value("status"), Some("active"));

    page.set("status", "inactive");
    page.set("description", "  spare part ");
    assert!(page.submit().await.is_submitted());

    let stored = client.get("2").await.unwrap();
    assert_eq!(stored.status, Status::Inactive);
    assert_eq!(stored.description.as_deref(), Some("spare part"));
}

#[tokio::test]
async fn standalone_form_reports_every_field() {
    let mut form = Form::with_values(widget_schema(), FormValues::new());
    let outcome: SubmitOutcome<()> = form.submit(|_| async { Ok(()) }).await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("empty form must not validate");
    };
    assert_eq!(errors.get("name"), Some("Name is required"));
    assert_eq!(errors.get("status"), Some("Status is required"));
    assert_eq!(errors.get("description"), None);
}
