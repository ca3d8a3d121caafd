//! 配置校验模块
//!
//! 校验规则：
//! - source.base_url 为 http/https 地址
//! - timeout_secs / interval_secs > 0
//! - sanitize.required_fields 非空, 且包含 order_id 与 status
//! - sink 名称非空且唯一, queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint};

/// 校验 PipelineBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_source(blueprint)?;
    validate_sanitize(blueprint)?;
    validate_sinks(blueprint)?;
    validate_schedule(blueprint)?;
    Ok(())
}

/// 校验数据源配置
fn validate_source(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;

    if !(source.base_url.starts_with("http://") || source.base_url.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "source.base_url",
            format!("expected an http(s) URL, got '{}'", source.base_url),
        ));
    }

    if source.workorders_path.trim().is_empty() {
        return Err(ContractError::config_validation(
            "source.workorders_path",
            "path cannot be empty",
        ));
    }

    if source.timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "source.timeout_secs",
            "timeout_secs must be > 0",
        ));
    }

    Ok(())
}

/// 校验清洗规则
fn validate_sanitize(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let fields = &blueprint.sanitize.required_fields;
    if fields.is_empty() {
        return Err(ContractError::config_validation(
            "sanitize.required_fields",
            "at least one required field is needed",
        ));
    }
    if let Some(idx) = fields.iter().position(|f| f.trim().is_empty()) {
        return Err(ContractError::config_validation(
            format!("sanitize.required_fields[{idx}]"),
            "field name cannot be empty",
        ));
    }
    for key in ["order_id", "status"] {
        if !fields.iter().any(|f| f == key) {
            return Err(ContractError::config_validation(
                "sanitize.required_fields",
                format!("'{key}' must be a required field"),
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

/// 校验调度间隔
fn validate_schedule(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.schedule.interval_secs == 0 {
        return Err(ContractError::config_validation(
            "schedule.interval_secs",
            "interval_secs must be > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkConfig, SinkType};

    #[test]
    fn test_default_config_is_valid() {
        let bp = PipelineBlueprint::default();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_bad_base_url() {
        let mut bp = PipelineBlueprint::default();
        bp.source.base_url = "localhost:8000".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("source.base_url"), "got: {err}");
    }

    #[test]
    fn test_zero_timeout() {
        let mut bp = PipelineBlueprint::default();
        bp.source.timeout_secs = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("timeout_secs must be > 0"), "got: {err}");
    }

    #[test]
    fn test_empty_required_fields() {
        let mut bp = PipelineBlueprint::default();
        bp.sanitize.required_fields.clear();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("required_fields"), "got: {err}");
    }

    #[test]
    fn test_required_fields_must_keep_identity() {
        let mut bp = PipelineBlueprint::default();
        bp.sanitize.required_fields = vec!["item_name".into(), "status".into()];
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("'order_id' must be a required field"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = PipelineBlueprint::default();
        bp.sinks.push(SinkConfig::new("orders_csv", SinkType::Log));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = PipelineBlueprint::default();
        bp.sinks[0].name = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_interval() {
        let mut bp = PipelineBlueprint::default();
        bp.schedule.interval_secs = 0;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_no_sinks_is_allowed() {
        let mut bp = PipelineBlueprint::default();
        bp.sinks.clear();
        assert!(validate(&bp).is_ok());
    }
}
