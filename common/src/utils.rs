use uuid::Uuid;

/// Fresh opaque session token. One per pairing screen lifetime.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn price_symbols(price_level: u8) -> String {
    "$".repeat(price_level as usize)
}

/// URL of the image behind a photo reference.
pub fn photo_url(api_url: &str, photo_reference: &str, max_width: u32) -> String {
    format!(
        "{}/photo?photo_reference={}&max_width={}",
        api_url.trim_end_matches('/'),
        photo_reference,
        max_width
    )
}

pub fn print_welcome_message() {
    println!(
        r#"
  ___              _   ___ _      _   _
 | __|__  ___  __| | | __(_)__ _| |_| |_
 | _/ _ \/ _ \/ _` | | _|| / _` | ' \  _|
 |_|\___/\___/\__,_| |_| |_\__, |_||_\__|
                           |___/
 Pick the restaurant you like more. The other one gets replaced.
"#
    );
}
