use super::error::ArchiveError;
use crate::orm::login::try_hash_password;

/// Secret given to restored users whose archive row carries no password hash.
/// Those users are flagged `password_reset_required`.
pub const RESTORED_USER_PLACEHOLDER_PASSWORD: &str = "ChangeMe!Restored1";

/// Returns the hash a restored user should carry and whether they must reset
/// their password.
pub fn reconstitute_credential(
    archived_hash: Option<&str>,
    original_user_id: i32,
) -> Result<(String, bool), ArchiveError> {
    match archived_hash {
        Some(hash) if !hash.trim().is_empty() => Ok((hash.to_string(), false)),
        _ => {
            warn!(
                "Restoring user {} without a stored credential; placeholder password assigned, reset required",
                original_user_id
            );
            let hash = try_hash_password(RESTORED_USER_PLACEHOLDER_PASSWORD)
                .map_err(|e| ArchiveError::Credential(e.to_string()))?;
            Ok((hash, true))
        }
    }
}
