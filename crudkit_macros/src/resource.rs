use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Token};

pub fn derive_resource(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            _ => panic!("Resource derive only supports structs with named fields"),
        },
        _ => panic!("Resource derive only supports structs"),
    };

    let collection = extract_collection(&input);
    let rename_all = serde_string(&input.attrs, "rename_all");

    let id_field = find_field(&fields, "id").unwrap_or_else(|| {
        panic!("Resource derive: no field marked with #[resource(id)] and no field named `id`")
    });
    let created_at_field = find_field(&fields, "created_at").unwrap_or_else(|| {
        panic!(
            "Resource derive: no field marked with #[resource(created_at)] and no field named `created_at`"
        )
    });

    let id_ident = id_field.ident.clone().unwrap();
    let created_at_ident = created_at_field.ident.clone().unwrap();
    let id_key = json_key(id_field, rename_all.as_deref());
    let created_at_key = json_key(created_at_field, rename_all.as_deref());

    let expanded = quote! {
        impl crudkit::Resource for #name {
            const COLLECTION: &'static str = #collection;
            const ID_KEY: &'static str = #id_key;
            const CREATED_AT_KEY: &'static str = #created_at_key;

            fn id(&self) -> &str {
                &self.#id_ident
            }

            fn created_at(&self) -> crudkit::chrono::DateTime<crudkit::chrono::Utc> {
                self.#created_at_ident
            }
        }
    };

    TokenStream::from(expanded)
}

fn extract_collection(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("resource") {
            continue;
        }

        let mut collection = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
            }
            Ok(())
        });

        if let Some(c) = collection {
            return c;
        }
    }

    format!("{}s", to_snake_case(&input.ident.to_string()))
}

/// Field marked `#[resource(<marker>)]`, falling back to a field named `<marker>`.
fn find_field<'a>(fields: &[&'a Field], marker: &str) -> Option<&'a Field> {
    for field in fields {
        for attr in &field.attrs {
            if !attr.path().is_ident("resource") {
                continue;
            }
            let mut marked = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(marker) {
                    marked = true;
                }
                Ok(())
            });
            if marked {
                return Some(field);
            }
        }
    }

    fields
        .iter()
        .copied()
        .find(|field| field.ident.as_ref().map(|i| i == marker).unwrap_or(false))
}

/// Reads `#[serde(<key> = "...")]` from a list of attributes.
fn serde_string(attrs: &[Attribute], key: &str) -> Option<String> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    found
}

fn json_key(field: &Field, rename_all: Option<&str>) -> String {
    if let Some(renamed) = serde_string(&field.attrs, "rename") {
        return renamed;
    }
    let ident: &Ident = field.ident.as_ref().unwrap();
    let raw = ident.to_string();
    let raw = raw.trim_start_matches("r#");
    match rename_all {
        Some("camelCase") => to_camel_case(raw, false),
        Some("PascalCase") => to_camel_case(raw, true),
        Some("kebab-case") => raw.replace('_', "-"),
        Some("SCREAMING_SNAKE_CASE") => raw.to_uppercase(),
        Some("lowercase") => raw.to_lowercase(),
        Some("UPPERCASE") => raw.to_uppercase(),
        _ => raw.to_string(),
    }
}

fn to_camel_case(s: &str, capitalize_first: bool) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = capitalize_first;
    for ch in s.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
