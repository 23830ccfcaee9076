use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::MediaType;

/// `requestBody`: one media type per content type, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// The single declared media type. Several content types come back as
    /// the error so the caller can report them.
    pub fn single_media(&self) -> Result<Option<(&str, &MediaType)>, Vec<String>> {
        if self.content.len() > 1 {
            return Err(self.content.keys().cloned().collect());
        }
        Ok(self
            .content
            .first()
            .map(|(content_type, media)| (content_type.as_str(), media)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}
