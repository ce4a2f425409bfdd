use axum::http::{HeaderName, HeaderValue, Method};
use core_config::{Environment, env_list};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Variable holding the comma-separated list of allowed origins.
pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// CORS layer restricted to `allowed_origins`.
///
/// Allows the methods the API exposes and the headers clients send,
/// including `X-Sharer-User-Id`. Preflight responses are cached for an hour.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            HeaderName::from_static("x-sharer-user-id"),
        ])
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin. Development only.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// When the variable is unset, development falls back to a permissive layer
/// and production refuses to start. A set but empty or unparsable list is
/// always an error.
pub fn cors_layer_from_env(environment: &Environment) -> io::Result<CorsLayer> {
    let Some(origins) = env_list(CORS_ALLOWED_ORIGIN) else {
        if environment.is_production() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} is required in production. Example: {}=https://shareit.example.com",
                    CORS_ALLOWED_ORIGIN, CORS_ALLOWED_ORIGIN
                ),
            ));
        }
        tracing::warn!("{} not set, allowing any origin", CORS_ALLOWED_ORIGIN);
        return Ok(create_permissive_cors_layer());
    };

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} cannot be empty", CORS_ALLOWED_ORIGIN),
        ));
    }

    let allowed = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {} value: {}", CORS_ALLOWED_ORIGIN, e),
            )
        })?;

    tracing::info!(origins = ?origins, "CORS configured");
    Ok(create_cors_layer(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_origin_is_permissive_in_development() {
        temp_env::with_var_unset(CORS_ALLOWED_ORIGIN, || {
            assert!(cors_layer_from_env(&Environment::Development).is_ok());
        });
    }

    #[test]
    fn test_unset_origin_fails_in_production() {
        temp_env::with_var_unset(CORS_ALLOWED_ORIGIN, || {
            let err = cors_layer_from_env(&Environment::Production).unwrap_err();
            assert!(err.to_string().contains(CORS_ALLOWED_ORIGIN));
        });
    }

    #[test]
    fn test_listed_origins_are_accepted() {
        temp_env::with_var(
            CORS_ALLOWED_ORIGIN,
            Some("http://localhost:3000, https://shareit.example.com"),
            || {
                assert!(cors_layer_from_env(&Environment::Production).is_ok());
            },
        );
    }

    #[test]
    fn test_blank_origin_list_is_rejected() {
        temp_env::with_var(CORS_ALLOWED_ORIGIN, Some(" , "), || {
            assert!(cors_layer_from_env(&Environment::Development).is_err());
        });
    }
}
