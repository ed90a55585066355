use sha2::{Digest, Sha256};

/// Derive a stable `(background, border)` colour pair from an area name.
pub fn colours_for(name: &str) -> (String, String) {
    let digest = Sha256::digest(name.as_bytes());
    let (r, g, b) = (digest[0], digest[1], digest[2]);
    (
        format!("rgba({r}, {g}, {b}, 0.5)"),
        format!("rgb({r}, {g}, {b})"),
    )
}
