use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One trading card as returned by the card-data API.
///
/// `id` is unique per distinct printing as assigned by the data source,
/// but it is not guaranteed stable across re-fetches of logically the
/// same card. Deduplication therefore goes through the identity-key
/// folding in `card-identity` rather than through `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    /// Present for double-faced cards only.
    #[serde(rename = "card_faces", skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<CardFace>>,
    /// Resolution label ("small", "normal", ...) to image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<BTreeMap<String, String>>,
    /// Free-form rarity label, compared case-insensitively.
    pub rarity: String,
}

impl Card {
    /// Domain sort rank: mythic first, unknown labels last.
    pub fn rarity_order(&self) -> u8 {
        match self.rarity.to_lowercase().as_str() {
            "mythic" => 0,
            "rare" => 1,
            "uncommon" => 2,
            "common" => 3,
            _ => 4,
        }
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Card {}

/// One face of a double-faced card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<BTreeMap<String, String>>,
}

/// One row of a profile's collection: a card plus the number of
/// copies held. `id` is generated locally when the row is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedCard {
    pub id: String,
    pub card: Card,
    pub count: u32,
}

impl CollectedCard {
    /// New row for a freshly pulled card, one copy held.
    pub fn new(card: Card) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            card,
            count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed-down payload in the shape the card-data API returns.
    const SINGLE_FACED: &str = r#"{
        "id": "c5656a5a-6067-4a92-9b6f-0ad40d1d495e",
        "name": "Black Lotus",
        "rarity": "mythic",
        "image_uris": { "normal": "https://cards.example.com/lotus.jpg" }
    }"#;

    const DOUBLE_FACED: &str = r#"{
        "id": "11bf83bb-c95b-4b4f-9a56-ce7a1816307a",
        "name": "Delver of Secrets // Insectile Aberration",
        "rarity": "common",
        "card_faces": [
            { "name": "Delver of Secrets",
              "image_uris": { "normal": "https://cards.example.com/delver-front.jpg" } },
            { "name": "Insectile Aberration",
              "image_uris": { "normal": "https://cards.example.com/delver-back.jpg" } }
        ]
    }"#;

    #[test]
    fn decode_single_faced_card() {
        let card: Card = serde_json::from_str(SINGLE_FACED).unwrap();
        assert_eq!(card.name, "Black Lotus");
        assert!(card.faces.is_none());
        assert_eq!(
            card.image_uris.unwrap().get("normal").map(String::as_str),
            Some("https://cards.example.com/lotus.jpg")
        );
    }

    #[test]
    fn decode_double_faced_card_uses_wire_name() {
        let card: Card = serde_json::from_str(DOUBLE_FACED).unwrap();
        let faces = card.faces.unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].name, "Delver of Secrets");
        assert!(card.image_uris.is_none());
    }

    #[test]
    fn rarity_order_ranks_known_labels() {
        let mut card: Card = serde_json::from_str(SINGLE_FACED).unwrap();
        assert_eq!(card.rarity_order(), 0);
        card.rarity = "RARE".to_string();
        assert_eq!(card.rarity_order(), 1);
        card.rarity = "uncommon".to_string();
        assert_eq!(card.rarity_order(), 2);
        card.rarity = "common".to_string();
        assert_eq!(card.rarity_order(), 3);
        card.rarity = "timeshifted".to_string();
        assert_eq!(card.rarity_order(), 4);
    }

    #[test]
    fn cards_compare_by_printing_id() {
        let a: Card = serde_json::from_str(SINGLE_FACED).unwrap();
        let mut b = a.clone();
        b.rarity = "common".to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn collected_cards_get_distinct_entry_ids() {
        let card: Card = serde_json::from_str(SINGLE_FACED).unwrap();
        let one = CollectedCard::new(card.clone());
        let two = CollectedCard::new(card);
        assert_eq!(one.count, 1);
        assert_ne!(one.id, two.id);
    }
}
