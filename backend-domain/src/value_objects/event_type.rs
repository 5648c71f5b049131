// Event type value object

use serde::{Deserialize, Serialize};

/// The fixed set of event categories the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageVisit,
    ImageView,
    ModalOpen,
    ModalClose,
    ModalNav,
    CodeCopy,
}

/// Wire names of every accepted event type, in declaration order.
pub const ALLOWED_EVENT_TYPES: [&str; 6] = [
    "page_visit",
    "image_view",
    "modal_open",
    "modal_close",
    "modal_nav",
    "code_copy",
];

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageVisit => "page_visit",
            EventType::ImageView => "image_view",
            EventType::ModalOpen => "modal_open",
            EventType::ModalClose => "modal_close",
            EventType::ModalNav => "modal_nav",
            EventType::CodeCopy => "code_copy",
        }
    }

    /// Strict parse: anything outside the enumeration is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page_visit" => Some(EventType::PageVisit),
            "image_view" => Some(EventType::ImageView),
            "modal_open" => Some(EventType::ModalOpen),
            "modal_close" => Some(EventType::ModalClose),
            "modal_nav" => Some(EventType::ModalNav),
            "code_copy" => Some(EventType::CodeCopy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_allowed_name() {
        for name in ALLOWED_EVENT_TYPES {
            let parsed = EventType::parse(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn parse_rejects_unknown_and_near_miss_names() {
        assert!(EventType::parse("click").is_none());
        assert!(EventType::parse("PAGE_VISIT").is_none());
        assert!(EventType::parse("page_visit ").is_none());
        assert!(EventType::parse("").is_none());
    }
}
