use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error, extract::Json};

pub mod tag {
	pub const POST: &str = "Post";
	pub const LIKE: &str = "Like";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Techblog Open API")
		.summary("Blog posts and likes")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post management".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::LIKE.into(),
			description: Some("Liking and unliking posts".into()),
			..Default::default()
		})
		.default_response_with::<Json<Vec<error::Message>>, _>(|res| {
			res.example(
				error::Message::new("Post not found")
					.detail("post", 1)
					.into_vec(),
			)
		})
}
