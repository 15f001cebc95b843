use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// One wall item exactly as the API returned it, kept for archival.
pub type RawPost = Value;

/// Normalized view of a wall item, derived once from its [`RawPost`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPost {
    pub id: i64,
    pub owner_id: i64,
    /// Unix timestamp of publication.
    pub date: i64,
    pub text: String,
    pub is_ad: bool,
    pub is_repost: bool,
    pub attachments: Vec<AttachmentRef>,
    /// Text of the first embedded shared post, if any.
    pub repost_text: Option<String>,
    /// Attachments of the first embedded shared post, if any.
    pub repost_attachments: Option<Vec<AttachmentRef>>,
}

/// Wire shape of a wall item. Only the fields the archiver reads.
#[derive(Debug, Deserialize)]
struct WallItem {
    id: i64,
    owner_id: i64,
    date: i64,
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    marked_as_ads: bool,
    #[serde(default)]
    copy_history: Option<Vec<SharedItem>>,
    #[serde(default)]
    attachments: Option<Vec<Value>>,
}

/// An embedded shared post inside `copy_history`.
#[derive(Debug, Deserialize)]
struct SharedItem {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    attachments: Option<Vec<Value>>,
}

impl NormalizedPost {
    /// Build the normalized view of one raw wall item.
    ///
    /// Only the first entry of `copy_history` is unwrapped; deeper repost
    /// chains are not followed.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field (`id`, `owner_id`, `date`) is
    /// missing or has the wrong type.
    pub fn from_raw(raw: &RawPost) -> Result<Self, serde_json::Error> {
        let item = WallItem::deserialize(raw)?;
        let shared = item.copy_history.as_deref().and_then(<[SharedItem]>::first);

        Ok(Self {
            id: item.id,
            owner_id: item.owner_id,
            date: item.date,
            text: item.text,
            is_ad: item.marked_as_ads,
            is_repost: shared.is_some(),
            attachments: decode_attachments(item.attachments.as_deref().unwrap_or_default()),
            repost_text: shared.map(|s| s.text.clone().unwrap_or_default()),
            repost_attachments: shared
                .map(|s| decode_attachments(s.attachments.as_deref().unwrap_or_default())),
        })
    }

    /// Own attachments followed by repost attachments, order preserved.
    #[must_use]
    pub fn all_attachments(&self) -> Vec<&AttachmentRef> {
        self.attachments
            .iter()
            .chain(self.repost_attachments.iter().flatten())
            .collect()
    }
}

/// `marked_as_ads` arrives as 0/1 but some payloads use booleans.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

fn decode_attachments(values: &[Value]) -> Vec<AttachmentRef> {
    values.iter().map(AttachmentRef::from_value).collect()
}

/// A wall attachment, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttachmentRef {
    Photo { photo: Photo },
    Doc { doc: Doc },
    Video { video: Video },
    /// Any attachment type the archiver does not persist.
    #[serde(other)]
    Other,
}

impl AttachmentRef {
    /// Decode one attachment. Malformed payloads of known types are logged
    /// and degrade to [`AttachmentRef::Other`].
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match Self::deserialize(value) {
            Ok(attachment) => attachment,
            Err(e) => {
                warn!(
                    kind = value.get("type").and_then(serde_json::Value::as_str).unwrap_or("<missing>"),
                    "Ignoring undecodable attachment: {e}"
                );
                Self::Other
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Photo { .. } => "photo",
            Self::Doc { .. } => "doc",
            Self::Video { .. } => "video",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Photo {
    pub id: i64,
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoSize {
    pub url: String,
    #[serde(default)]
    pub width: u64,
    #[serde(default)]
    pub height: u64,
}

impl Photo {
    /// The size variant with the largest pixel area. Ties go to the
    /// earliest listed variant.
    #[must_use]
    pub fn largest_size(&self) -> Option<&PhotoSize> {
        self.sizes
            .iter()
            .rev()
            .max_by_key(|size| size.width.saturating_mul(size.height))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Doc {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}
