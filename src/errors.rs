use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkmarkError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    MissingParameter(String),
    NotFound(String),
    Conflict(String),
    Serialization(String),
    StoragePluginNotFound(String),
}

impl LinkmarkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkmarkError::DatabaseConfig(_) => "E001",
            LinkmarkError::DatabaseConnection(_) => "E002",
            LinkmarkError::DatabaseOperation(_) => "E003",
            LinkmarkError::Validation(_) => "E004",
            LinkmarkError::MissingParameter(_) => "E005",
            LinkmarkError::NotFound(_) => "E006",
            LinkmarkError::Conflict(_) => "E007",
            LinkmarkError::Serialization(_) => "E008",
            LinkmarkError::StoragePluginNotFound(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkmarkError::DatabaseConfig(_) => "Database Configuration Error",
            LinkmarkError::DatabaseConnection(_) => "Database Connection Error",
            LinkmarkError::DatabaseOperation(_) => "Database Operation Error",
            LinkmarkError::Validation(_) => "Validation Error",
            LinkmarkError::MissingParameter(_) => "Missing Parameter",
            LinkmarkError::NotFound(_) => "Not Found",
            LinkmarkError::Conflict(_) => "Conflict",
            LinkmarkError::Serialization(_) => "Serialization Error",
            LinkmarkError::StoragePluginNotFound(_) => "Storage Plugin Not Found",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkmarkError::DatabaseConfig(msg) => msg,
            LinkmarkError::DatabaseConnection(msg) => msg,
            LinkmarkError::DatabaseOperation(msg) => msg,
            LinkmarkError::Validation(msg) => msg,
            LinkmarkError::MissingParameter(msg) => msg,
            LinkmarkError::NotFound(msg) => msg,
            LinkmarkError::Conflict(msg) => msg,
            LinkmarkError::Serialization(msg) => msg,
            LinkmarkError::StoragePluginNotFound(msg) => msg,
        }
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkmarkError {}

// 便捷的构造函数
impl LinkmarkError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::Validation(msg.into())
    }

    pub fn missing_parameter<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::MissingParameter(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::Serialization(msg.into())
    }

    pub fn storage_plugin_not_found<T: Into<String>>(msg: T) -> Self {
        LinkmarkError::StoragePluginNotFound(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkmarkError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkmarkError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkmarkError {
    fn from(err: serde_json::Error) -> Self {
        LinkmarkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkmarkError>;
