use serde::{Deserialize, Serialize};

use crate::errors::OrchestratorError;

/// 服务注册记录，以名称为唯一键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl ServiceRecord {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Result<Self, OrchestratorError> {
        let record = Self {
            name: name.into().trim().to_string(),
            host: host.into().trim().to_string(),
            port,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.name.is_empty() {
            return Err(OrchestratorError::InvalidRegistration(
                "服务名称不能为空".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(OrchestratorError::InvalidRegistration(
                "服务地址不能为空".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(OrchestratorError::InvalidRegistration(
                "服务端口必须大于0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
