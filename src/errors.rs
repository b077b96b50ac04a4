use std::fmt;

#[derive(Debug, Clone)]
pub enum QrsuError {
    InvalidUrl(String),
    UnsafeUrl(String),
    UnrecognizedExtension(String),
    Persistence(String),
    Render(String),
    Configuration(String),
    Serialization(String),
    FileOperation(String),
    StorageConnection(String),
}

impl QrsuError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            QrsuError::InvalidUrl(_) => "E001",
            QrsuError::UnsafeUrl(_) => "E002",
            QrsuError::UnrecognizedExtension(_) => "E003",
            QrsuError::Persistence(_) => "E004",
            QrsuError::Render(_) => "E005",
            QrsuError::Configuration(_) => "E006",
            QrsuError::Serialization(_) => "E007",
            QrsuError::FileOperation(_) => "E008",
            QrsuError::StorageConnection(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            QrsuError::InvalidUrl(_) => "Invalid URL",
            QrsuError::UnsafeUrl(_) => "Unsafe URL",
            QrsuError::UnrecognizedExtension(_) => "Unrecognized Extension",
            QrsuError::Persistence(_) => "Persistence Error",
            QrsuError::Render(_) => "Render Error",
            QrsuError::Configuration(_) => "Configuration Error",
            QrsuError::Serialization(_) => "Serialization Error",
            QrsuError::FileOperation(_) => "File Operation Error",
            QrsuError::StorageConnection(_) => "Storage Connection Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            QrsuError::InvalidUrl(msg) => msg,
            QrsuError::UnsafeUrl(msg) => msg,
            QrsuError::UnrecognizedExtension(msg) => msg,
            QrsuError::Persistence(msg) => msg,
            QrsuError::Render(msg) => msg,
            QrsuError::Configuration(msg) => msg,
            QrsuError::Serialization(msg) => msg,
            QrsuError::FileOperation(msg) => msg,
            QrsuError::StorageConnection(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for QrsuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for QrsuError {}

// 便捷的构造函数
impl QrsuError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        QrsuError::InvalidUrl(msg.into())
    }

    pub fn unsafe_url<T: Into<String>>(msg: T) -> Self {
        QrsuError::UnsafeUrl(msg.into())
    }

    pub fn unrecognized_extension<T: Into<String>>(msg: T) -> Self {
        QrsuError::UnrecognizedExtension(msg.into())
    }

    pub fn persistence<T: Into<String>>(msg: T) -> Self {
        QrsuError::Persistence(msg.into())
    }

    pub fn render<T: Into<String>>(msg: T) -> Self {
        QrsuError::Render(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        QrsuError::Configuration(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        QrsuError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        QrsuError::FileOperation(msg.into())
    }

    pub fn storage_connection<T: Into<String>>(msg: T) -> Self {
        QrsuError::StorageConnection(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for QrsuError {
    fn from(err: std::io::Error) -> Self {
        QrsuError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for QrsuError {
    fn from(err: serde_json::Error) -> Self {
        QrsuError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for QrsuError {
    fn from(err: redis::RedisError) -> Self {
        QrsuError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QrsuError>;
