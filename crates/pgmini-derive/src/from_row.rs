//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, FieldsNamed, FieldsUnnamed, LitStr, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow can only be derived for structs",
            ));
        }
    };

    let body = match &data.fields {
        Fields::Named(fields) => named_body(fields, ignore_extra_columns(&input)?)?,
        Fields::Unnamed(fields) => positional_body(fields),
        Fields::Unit => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow cannot be derived for unit structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::pgmini::FromRow for #name #ty_generics #where_clause {
            fn from_row<__R: ::pgmini::RowExt>(row: &__R) -> ::pgmini::Result<Self> {
                #body
            }
        }
    })
}

fn named_body(fields: &FieldsNamed, ignore_extra: bool) -> Result<TokenStream> {
    let mut columns: Vec<String> = Vec::with_capacity(fields.named.len());
    let mut inits = Vec::with_capacity(fields.named.len());

    for field in &fields.named {
        let ident = field.ident.as_ref().unwrap();
        let column = column_name(field)?;
        if columns.contains(&column) {
            return Err(syn::Error::new_spanned(
                field,
                format!("column `{column}` is mapped by more than one field"),
            ));
        }
        inits.push(quote! {
            #ident: row.try_get_column(#column)?
        });
        columns.push(column);
    }

    let check = if ignore_extra {
        quote! {}
    } else {
        quote! {
            ::pgmini::row::ensure_columns_mapped(row, &[#(#columns),*])?;
        }
    };

    Ok(quote! {
        #check
        Ok(Self {
            #(#inits),*
        })
    })
}

fn positional_body(fields: &FieldsUnnamed) -> TokenStream {
    let count = fields.unnamed.len();
    let inits = (0..count).map(|index| quote! { row.try_get_index(#index)? });

    quote! {
        ::pgmini::row::ensure_column_count(row, #count)?;
        Ok(Self(#(#inits),*))
    }
}

fn ignore_extra_columns(input: &DeriveInput) -> Result<bool> {
    let mut ignore = false;
    for attr in &input.attrs {
        if !attr.path().is_ident("pgmini") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore_extra_columns") {
                ignore = true;
                Ok(())
            } else {
                Err(meta.error("unknown pgmini attribute, expected `ignore_extra_columns`"))
            }
        })?;
    }
    Ok(ignore)
}

fn column_name(field: &Field) -> Result<String> {
    let mut column = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("pgmini") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown pgmini attribute, expected `column = \"...\"`"))
            }
        })?;
    }

    Ok(column.unwrap_or_else(|| {
        let ident = field.ident.as_ref().unwrap().to_string();
        ident.strip_prefix("r#").map(str::to_string).unwrap_or(ident)
    }))
}
