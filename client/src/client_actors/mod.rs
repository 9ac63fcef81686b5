pub mod favorite_sync;
pub mod pair_presenter;
pub mod restaurant_stream;
pub mod ui_handler;
