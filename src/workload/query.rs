//! PQL query construction

/// `SetBit(<bitmap>, '<frame>', <profile>)`
///
/// Ids are written as given, negative values included.
pub fn set_bit(bitmap_id: i64, frame: &str, profile_id: i64) -> String {
    format!("SetBit({}, '{}', {})", bitmap_id, frame, profile_id)
}
