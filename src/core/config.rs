use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub image: ImageConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for report photos
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL used when building photo URLs (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Prefix under which report photos are stored (e.g., "public")
    pub public_prefix: String,
}

/// Bounds and quality applied to every uploaded report photo
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 0-100
    pub quality: u8,
    /// Raw upload size accepted before compression
    pub max_upload_size: usize,
    /// Upper bound on a single decoder allocation
    pub max_decode_alloc: u64,
}

/// Expiry sweep scheduling
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Minimum time between two sweeps
    pub sweep_interval: Duration,
    /// Inactivity after completion before a report is selected by the sweep
    pub expiry_after: Duration,
    /// How often the worker wakes up to check whether a sweep is due
    pub check_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            image: ImageConfig::from_env()?,
            lifecycle: LifecycleConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Balungpisah Report Pipeline".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Report aggregation, lifecycle sweeps and photo compression".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "balungpisah-photos".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let public_prefix =
            env::var("MINIO_PUBLIC_PREFIX").unwrap_or_else(|_| "public".to_string());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            public_prefix,
        })
    }
}

impl ImageConfig {
    pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
    pub const DEFAULT_QUALITY: u8 = 80;
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024; // 20MB
    const DEFAULT_MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024; // 512MB

    pub fn from_env() -> Result<Self, String> {
        let max_width = env::var("IMAGE_MAX_WIDTH")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_DIMENSION.to_string())
            .parse::<u32>()
            .map_err(|_| "IMAGE_MAX_WIDTH must be a valid number".to_string())?;

        let max_height = env::var("IMAGE_MAX_HEIGHT")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_DIMENSION.to_string())
            .parse::<u32>()
            .map_err(|_| "IMAGE_MAX_HEIGHT must be a valid number".to_string())?;

        let quality = env::var("IMAGE_QUALITY")
            .unwrap_or_else(|_| Self::DEFAULT_QUALITY.to_string())
            .parse::<u8>()
            .map_err(|_| "IMAGE_QUALITY must be a number between 0 and 100".to_string())?;
        if quality > 100 {
            return Err("IMAGE_QUALITY must be a number between 0 and 100".to_string());
        }

        if max_width == 0 || max_height == 0 {
            return Err("IMAGE_MAX_WIDTH and IMAGE_MAX_HEIGHT must be positive".to_string());
        }

        let max_upload_size = env::var("IMAGE_MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "IMAGE_MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        let max_decode_alloc = env::var("IMAGE_MAX_DECODE_ALLOC")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_DECODE_ALLOC.to_string())
            .parse::<u64>()
            .map_err(|_| "IMAGE_MAX_DECODE_ALLOC must be a valid number".to_string())?;

        Ok(Self {
            max_width,
            max_height,
            quality,
            max_upload_size,
            max_decode_alloc,
        })
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: Self::DEFAULT_MAX_DIMENSION,
            max_height: Self::DEFAULT_MAX_DIMENSION,
            quality: Self::DEFAULT_QUALITY,
            max_upload_size: Self::DEFAULT_MAX_UPLOAD_SIZE,
            max_decode_alloc: Self::DEFAULT_MAX_DECODE_ALLOC,
        }
    }
}

impl LifecycleConfig {
    const DEFAULT_SWEEP_INTERVAL_HOURS: u64 = 24;
    const DEFAULT_EXPIRY_AFTER_DAYS: u64 = 30;
    const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let sweep_interval_hours = env::var("SWEEP_INTERVAL_HOURS")
            .unwrap_or_else(|_| Self::DEFAULT_SWEEP_INTERVAL_HOURS.to_string())
            .parse::<u64>()
            .map_err(|_| "SWEEP_INTERVAL_HOURS must be a valid number".to_string())?;

        let expiry_after_days = env::var("REPORT_EXPIRY_AFTER_DAYS")
            .unwrap_or_else(|_| Self::DEFAULT_EXPIRY_AFTER_DAYS.to_string())
            .parse::<u64>()
            .map_err(|_| "REPORT_EXPIRY_AFTER_DAYS must be a valid number".to_string())?;

        let check_interval_secs = env::var("SWEEP_CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_CHECK_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SWEEP_CHECK_INTERVAL_SECS must be a valid number".to_string())?;

        Self::from_parts(sweep_interval_hours, expiry_after_days, check_interval_secs)
    }

    fn from_parts(
        sweep_interval_hours: u64,
        expiry_after_days: u64,
        check_interval_secs: u64,
    ) -> Result<Self, String> {
        if check_interval_secs == 0 {
            return Err("SWEEP_CHECK_INTERVAL_SECS must be positive".to_string());
        }

        let sweep_interval = sweep_interval_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or_else(|| "SWEEP_INTERVAL_HOURS is too large".to_string())?;

        // The sweep compares against chrono timestamps, so the threshold must fit there too
        let expiry_after = expiry_after_days
            .checked_mul(24 * 3600)
            .map(Duration::from_secs)
            .filter(|d| chrono::Duration::from_std(*d).is_ok())
            .ok_or_else(|| "REPORT_EXPIRY_AFTER_DAYS is too large".to_string())?;

        Ok(Self {
            sweep_interval,
            expiry_after,
            check_interval: Duration::from_secs(check_interval_secs),
        })
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_HOURS * 3600),
            expiry_after: Duration::from_secs(Self::DEFAULT_EXPIRY_AFTER_DAYS * 24 * 3600),
            check_interval: Duration::from_secs(Self::DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_config_from_parts() {
        let config = LifecycleConfig::from_parts(12, 7, 60).unwrap();
        assert_eq!(config.sweep_interval, Duration::from_secs(12 * 3600));
        assert_eq!(config.expiry_after, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.check_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_lifecycle_config_rejects_overflowing_values() {
        assert!(LifecycleConfig::from_parts(u64::MAX, 30, 60).is_err());
        assert!(LifecycleConfig::from_parts(24, u64::MAX, 60).is_err());
        // Fits in std Duration but not in a chrono Duration
        assert!(LifecycleConfig::from_parts(24, u64::MAX / (24 * 3600), 60).is_err());
        assert!(LifecycleConfig::from_parts(24, 30, 0).is_err());
    }
}
