use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	error: Vec<ErrorArgs>,
}

#[derive(FromMeta)]
struct ErrorArgs {
	status: syn::LitInt,
	description: String,
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);
	let (summary, description) = match extract_doc_comment(&function) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let fn_name = format_ident!("{}_docs", function.sig.ident);
	let fn_vis = &function.vis;

	let tags = args.tag.iter();
	let errors = args.error.into_iter().map(|error| {
		let status = error.status;
		let description = error.description;

		quote! {
			.response_with::<
				#status,
				crate::extract::Json<::std::vec::Vec<crate::error::Message<'static>>>,
				_,
			>(|res| res.description(#description))
		}
	});

	quote! {
		#function

		#fn_vis fn #fn_name(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.description(#description).summary(#summary)
				#(
					.tag(#tags)
				)*
				#(
					#errors
				)*
		}
	}
	.into()
}

/// Splits the doc comment into a one-line summary and the remaining description.
fn extract_doc_comment(function: &syn::ItemFn) -> syn::Result<(String, String)> {
	let mut doc_lines = String::new();

	for attr in &function.attrs {
		let syn::Meta::NameValue(doc_attr) = &attr.meta else {
			continue;
		};

		if !doc_attr.path.is_ident("doc") {
			continue;
		}

		if let syn::Expr::Lit(syn::ExprLit {
			lit: syn::Lit::Str(literal),
			..
		}) = &doc_attr.value
		{
			// Trim lines like rustdoc does
			doc_lines += literal.value().trim();
			doc_lines += "\n";
		}
	}

	let doc_lines = doc_lines.trim().replace("\\\n", "");
	let mut paragraphs = doc_lines.splitn(2, '\n').filter(|x| !x.is_empty());

	let summary = paragraphs.next().map(ToOwned::to_owned).ok_or_else(|| {
		syn::Error::new(function.sig.ident.span(), "route is missing a summary line")
	})?;
	let description = paragraphs
		.next()
		.map(|x| x.replace('\n', " "))
		.ok_or_else(|| {
			syn::Error::new(
				function.sig.span(),
				"route is missing a description after the summary line",
			)
		})?;

	Ok((summary, description))
}
