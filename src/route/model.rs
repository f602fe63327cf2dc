use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// A numeric id taken from the path.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	#[validate(range(min = 1))]
	pub id: i64,
}
