use crate::foundation::error::{CardreelError, CardreelResult};

/// Titles longer than this many characters are truncated.
pub const MAX_TITLE_CHARS: usize = 80;
/// Characters kept from an over-long title before the ellipsis.
pub const TRUNCATED_TITLE_CHARS: usize = 77;
pub const ELLIPSIS: char = '…';

/// One user-selected card.
///
/// Only `title` is drawn. `image_reference` is carried through from callers but is not composited
/// into slides.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, alias = "image_url", skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// The text that ends up on the slide for the card at zero-based `index`.
    ///
    /// Blank titles become `Card <index + 1>`; long titles are cut with [`truncate_title`].
    pub fn display_title(&self, index: usize) -> String {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            return format!("Card {}", index + 1);
        }
        truncate_title(trimmed)
    }
}

/// Cut titles over [`MAX_TITLE_CHARS`] to [`TRUNCATED_TITLE_CHARS`] plus an ellipsis.
///
/// Counts Unicode scalar values, never splits one.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let mut out: String = title.chars().take(TRUNCATED_TITLE_CHARS).collect();
    out.push(ELLIPSIS);
    out
}

/// Request body accepted at the boundary: `{"cards": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub cards: Option<Vec<Card>>,
}

impl GenerateRequest {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards: Some(cards) }
    }

    pub fn from_json(bytes: &[u8]) -> CardreelResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| CardreelError::invalid_request(format!("malformed request body: {e}")))
    }

    /// Non-empty card list, or [`CardreelError::InvalidRequest`].
    pub fn cards(&self) -> CardreelResult<&[Card]> {
        match self.cards.as_deref() {
            Some(cards) if !cards.is_empty() => Ok(cards),
            _ => Err(CardreelError::invalid_request("no cards supplied")),
        }
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}
