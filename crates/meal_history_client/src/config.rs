use crate::MealHistoryError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub api_key: SecretString,
    pub data_source: String,
    pub database: String,
    /// Explicit meal collection; `None` means auto-detect.
    pub meal_collection: Option<String>,
    pub goals_collection: String,
    pub user_field: String,
    pub created_field: String,
}

impl Config {
    pub fn from_env() -> Result<Self, MealHistoryError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, MealHistoryError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_url = get("MEAL_DATA_API_URL")
            .ok_or_else(|| MealHistoryError::Config("MEAL_DATA_API_URL missing".into()))?;
        let api_key = get("MEAL_DATA_API_KEY")
            .ok_or_else(|| MealHistoryError::Config("MEAL_DATA_API_KEY missing".into()))?;
        let data_source = get("MEAL_DATA_SOURCE").unwrap_or_else(|| "Cluster0".into());
        let database = get("DB_NAME").unwrap_or_else(|| "test".into());
        let meal_collection = get("MEAL_COLLECTION")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let goals_collection = get("GOALS_COLLECTION").unwrap_or_else(|| "goals".into());
        let user_field = get("USER_FIELD").unwrap_or_else(|| "userId".into());
        let created_field = get("CREATED_FIELD").unwrap_or_else(|| "createdAt".into());
        Ok(Self {
            api_url,
            api_key: SecretString::new(api_key.into()),
            data_source,
            database,
            meal_collection,
            goals_collection,
            user_field,
            created_field,
        })
    }
}
