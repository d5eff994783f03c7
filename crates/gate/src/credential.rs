use keygate_store::ProviderCredential;

/// A provider is usable once it carries a key that is not just whitespace.
pub fn has_api_key(provider: &ProviderCredential) -> bool {
    !provider.api_key.trim().is_empty()
}

/// Absence counts as "not configured"; the caller never sees a distinct failure.
pub fn is_configured(provider: Option<&ProviderCredential>) -> bool {
    provider.is_some_and(has_api_key)
}
