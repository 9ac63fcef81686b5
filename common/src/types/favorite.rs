use crate::types::candidate::Candidate;
use serde::{Deserialize, Serialize};

/// A favorite as stored by the favorites endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub place_id: String,
    pub name: String,
    /// Photo reference or full image URL.
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price: Option<u8>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl From<&Candidate> for FavoriteRecord {
    fn from(candidate: &Candidate) -> Self {
        Self {
            place_id: candidate.id.clone(),
            name: candidate.name.clone(),
            picture: candidate.photo_reference.clone(),
            address: candidate.vicinity.clone(),
            rating: candidate.rating,
            price: candidate.price_level,
            lat: candidate.location.map(|loc| loc.lat),
            lng: candidate.location.map(|loc| loc.lng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::candidate::PlaceLocation;

    #[test]
    fn record_carries_candidate_fields() {
        let mut candidate = Candidate::new("R1", "Veselka");
        candidate.photo_reference = Some("ref-1".into());
        candidate.vicinity = Some("144 2nd Ave".into());
        candidate.price_level = Some(2);
        candidate.location = Some(PlaceLocation {
            lat: 40.729,
            lng: -73.987,
        });

        let record = FavoriteRecord::from(&candidate);
        assert_eq!(record.place_id, "R1");
        assert_eq!(record.picture.as_deref(), Some("ref-1"));
        assert_eq!(record.address.as_deref(), Some("144 2nd Ave"));
        assert_eq!(record.price, Some(2));
        assert_eq!(record.lat, Some(40.729));
        assert_eq!(record.lng, Some(-73.987));
    }
}
