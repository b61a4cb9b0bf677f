use narrator_config::TelemetryConfig;
use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource as semconv;

/// Resource attached to every exported span
pub fn build_resource(config: &TelemetryConfig) -> Resource {
    let mut attrs = vec![
        KeyValue::new(semconv::SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(semconv::SERVICE_VERSION, env!("CARGO_PKG_VERSION").to_string()),
    ];

    let mut extra: Vec<_> = config.resource_attributes.iter().collect();
    extra.sort();

    for (key, value) in extra {
        attrs.push(KeyValue::new(key.clone(), value.clone()));
    }

    Resource::builder().with_attributes(attrs).build()
}

#[cfg(test)]
mod tests {
    use opentelemetry::{Key, Value};

    use super::*;

    #[test]
    fn resource_carries_service_name_and_extras() {
        let config = TelemetryConfig {
            service_name: "narrator-test".to_string(),
            resource_attributes: [("deployment.environment".to_string(), "ci".to_string())].into(),
            ..TelemetryConfig::default()
        };

        let resource = build_resource(&config);

        assert_eq!(
            resource.get(&Key::from_static_str(semconv::SERVICE_NAME)),
            Some(Value::from("narrator-test"))
        );
        assert_eq!(
            resource.get(&Key::from_static_str("deployment.environment")),
            Some(Value::from("ci"))
        );
    }
}
