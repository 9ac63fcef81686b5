use crate::types::geo::GeoCoordinate;
use crate::utils::price_symbols;
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};

/// Position of a place as the service reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceLocation {
    pub lat: f64,
    pub lng: f64,
}

/// One restaurant as returned by the remote service.
///
/// Candidates are immutable once decoded; whether one is a favorite is not
/// stored here but overlaid at presentation time.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable place identifier, used for dedup and favoriting.
    #[serde(rename = "place_id")]
    pub id: String,
    pub name: String,
    /// Opaque reference resolved to an image by the photo endpoint.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub photo_reference: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub location: Option<PlaceLocation>,
}

impl Candidate {
    /// A candidate with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo_reference: None,
            vicinity: None,
            rating: None,
            user_ratings_total: None,
            price_level: None,
            open_now: None,
            location: None,
        }
    }

    /// The place position, if the service sent a valid one.
    pub fn position(&self) -> Option<GeoCoordinate> {
        self.location
            .and_then(|loc| GeoCoordinate::new(loc.lat, loc.lng).ok())
    }

    /// One-line summary used by the terminal front end.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(rating) = self.rating {
            match self.user_ratings_total {
                Some(total) => parts.push(format!("★ {:.1} ({})", rating, total)),
                None => parts.push(format!("★ {:.1}", rating)),
            }
        }
        if let Some(level) = self.price_level.filter(|level| *level > 0) {
            parts.push(price_symbols(level));
        }
        match self.open_now {
            Some(true) => parts.push("open now".to_string()),
            Some(false) => parts.push("closed".to_string()),
            None => {}
        }
        if let Some(vicinity) = &self.vicinity {
            parts.push(vicinity.clone());
        }
        parts.join(" · ")
    }
}
