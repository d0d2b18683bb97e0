/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `token_lifetime` is read
/// from `{PREFIX}TOKEN_LIFETIME`. Call `from_env()` once at startup and pass
/// the result down explicitly.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Env var prefix shared by every field (e.g. `"PASSWORDLESS_"`).
    const PREFIX: &'static str = "";

    fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(Self::PREFIX).from_env()
    }

    /// Load from an explicit list of `(KEY, value)` pairs instead of the process env.
    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(Self::PREFIX).from_iter(vars)
    }
}
