/// Markers delimiting the sections of a raw assistant response.
const USER_MARKER: &str = "[user]";
const ASSISTANT_MARKER: &str = "[assistant]";
const METADATA_MARKER: &str = "Metadata";

/// Extract the assistant-visible portion of a raw response.
///
/// Responses arrive as one text blob echoing the `[user]` section, the
/// `[assistant]` reply, and a trailing `Metadata` block. The reply and the
/// metadata are kept, joined by a newline. If any of the three markers is
/// missing the blob passes through verbatim, which covers plain-text and
/// legacy response formats.
///
/// The `[user]` marker's position is never used; only its presence gates
/// the split.
pub fn split_assistant_response(response: &str) -> String {
    let user_idx = response.find(USER_MARKER);
    let assistant_idx = response.find(ASSISTANT_MARKER);
    let metadata_idx = response.find(METADATA_MARKER);

    let (Some(_), Some(assistant_idx), Some(metadata_idx)) =
        (user_idx, assistant_idx, metadata_idx)
    else {
        return response.to_string();
    };

    // Out-of-order markers yield an empty reply rather than a panic.
    let reply_start = assistant_idx + ASSISTANT_MARKER.len();
    let reply = response.get(reply_start..metadata_idx).unwrap_or("").trim();
    let metadata = response[metadata_idx..].trim();

    format!("{}\n{}", reply, metadata)
}
