mod resource;

use proc_macro::TokenStream;

/// Derive `crudkit::Resource` for a record struct.
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Resource)]
/// #[serde(rename_all = "camelCase")]
/// #[resource(collection = "widgets")]
/// struct Widget {
///     #[resource(id)]
///     pub id: String,
///     pub name: String,
///     #[resource(created_at)]
///     pub created_at: DateTime<Utc>,
/// }
/// ```
///
/// Without `#[resource(collection = "...")]` the collection defaults to the
/// snake_case struct name plus `s`. Without field markers the fields named
/// `id` and `created_at` are used. The JSON key constants follow the struct's
/// `#[serde(rename_all = ...)]` and field-level `#[serde(rename = ...)]`.
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    resource::derive_resource(input)
}
