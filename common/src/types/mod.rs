pub mod candidate;
pub mod favorite;
pub mod geo;
pub mod pair_view;
pub mod slot;
