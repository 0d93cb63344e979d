/// Get the current time as an RFC 3339 string (UTC).
///
/// This is the encoding of every server-assigned timestamp in the store.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
