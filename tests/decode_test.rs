use envdecode::{
    ByteSize, Config, DecodeError, Decoder, EnvValue, MapEnv, ParseError, TypeRegistry,
    ValueErrorKind, decode,
};
use std::time::Duration;

#[derive(Debug, Default, PartialEq)]
pub struct CustomType(String);

impl EnvValue for CustomType {
    fn parse_env(raw: &str) -> Result<Self, ParseError> {
        Ok(CustomType(raw.to_string()))
    }
}

#[derive(Debug, Default, Config)]
pub struct TestConfig {
    #[field(default = "a")]
    pub a: String,
    #[field(required)]
    pub b: String,
    #[field(default = "c")]
    pub c: CustomType,
    #[field(nested)]
    pub nested_config: NestedConfig,
}

#[derive(Debug, Default, Config)]
pub struct NestedConfig {
    pub x: String,
}

#[derive(Debug, Default, Config)]
pub struct Optionals {
    pub name: String,
    pub port: u16,
    pub ratio: f64,
    pub enabled: bool,
    pub tags: Vec<String>,
    pub timeout: Duration,
    pub limit: Option<u32>,
}

#[test]
fn test_decode_end_to_end() {
    let env = MapEnv::from([("B", "b"), ("NESTED_CONFIG_X", "x")]);
    let config: TestConfig = decode(env, "").unwrap();

    assert_eq!(config.a, "a");
    assert_eq!(config.b, "b");
    assert_eq!(config.c, CustomType("c".to_string()));
    assert_eq!(config.nested_config.x, "x");
}

#[test]
fn test_nested_name_with_prefix() {
    #[derive(Debug, Default, Config)]
    pub struct Outer {
        #[field(nested)]
        pub nested: Inner,
    }

    #[derive(Debug, Default, Config)]
    pub struct Inner {
        pub x: String,
    }

    let config: Outer = decode(MapEnv::from([("PFX_NESTED_X", "x")]), "PFX_").unwrap();
    assert_eq!(config.nested.x, "x");
}

#[test]
fn test_optional_fields_keep_zero_values() {
    let config: Optionals = decode(MapEnv::new(), "").unwrap();

    assert_eq!(config.name, "");
    assert_eq!(config.port, 0);
    assert_eq!(config.ratio, 0.0);
    assert!(!config.enabled);
    assert!(config.tags.is_empty());
    assert_eq!(config.timeout, Duration::ZERO);
    assert_eq!(config.limit, None);
}

#[test]
fn test_all_primitive_kinds() {
    let env = MapEnv::from([
        ("NAME", "svc"),
        ("PORT", "0x1F90"),
        ("RATIO", "2.5e-1"),
        ("ENABLED", "T"),
        ("TAGS", "a,b,c"),
        ("TIMEOUT", "1m30s"),
        ("LIMIT", "0b1000"),
    ]);
    let config: Optionals = decode(env, "").unwrap();

    assert_eq!(config.name, "svc");
    assert_eq!(config.port, 8080);
    assert_eq!(config.ratio, 0.25);
    assert!(config.enabled);
    assert_eq!(config.tags, vec!["a", "b", "c"]);
    assert_eq!(config.timeout, Duration::from_secs(90));
    assert_eq!(config.limit, Some(8));
}

#[test]
fn test_missing_required_is_one_error() {
    let err = Decoder::new(MapEnv::new())
        .report(false)
        .decode::<TestConfig>()
        .unwrap_err();

    let errors = err.value_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].env_var, "B");
    assert!(errors[0].is_required());
    assert!(err.to_string().contains("env var B: required field is not set"));
}

#[test]
fn test_independent_failures_aggregate() {
    #[derive(Debug, Default, Config)]
    pub struct TwoBroken {
        #[field(required)]
        pub token: String,
        pub port: u16,
        #[field(default = "ok")]
        pub name: String,
    }

    let env = MapEnv::from([("APP_PORT", "http")]);
    let err = Decoder::new(env)
        .prefix("APP_")
        .report(false)
        .decode::<TwoBroken>()
        .unwrap_err();

    let DecodeError::Values(errors) = err else {
        panic!("Expected value errors");
    };
    assert_eq!(errors.env_vars(), vec!["APP_TOKEN", "APP_PORT"]);
    assert!(matches!(errors[1].kind, ValueErrorKind::Invalid(_)));
}

#[test]
fn test_int_sequence() {
    #[derive(Debug, Default, Config)]
    pub struct Numbers {
        pub values: Vec<i64>,
    }

    let config: Numbers = decode(MapEnv::from([("VALUES", "1,2,3")]), "").unwrap();
    assert_eq!(config.values, vec![1, 2, 3]);

    let err = Decoder::new(MapEnv::from([("VALUES", "1,,3")]))
        .report(false)
        .decode::<Numbers>()
        .unwrap_err();
    match &err.value_errors()[0].kind {
        ValueErrorKind::Invalid(ParseError::Element { index, .. }) => assert_eq!(*index, 1),
        other => panic!("Expected element error, got {other:?}"),
    }
}

#[test]
fn test_u64_overflow() {
    #[derive(Debug, Default, Config)]
    pub struct Big {
        pub count: u64,
    }

    let err = Decoder::new(MapEnv::from([("COUNT", "18446744073709551616")]))
        .report(false)
        .decode::<Big>()
        .unwrap_err();
    assert!(err.to_string().contains("number too large"));
}

#[test]
fn test_registered_converter_beats_hook() {
    let mut registry = TypeRegistry::with_builtins();
    registry.register(|raw: &str| Ok::<_, ParseError>(CustomType(format!("registered:{raw}"))));

    let config: TestConfig = Decoder::new(MapEnv::from([("B", "b"), ("C", "value")]))
        .registry(registry)
        .decode()
        .unwrap();
    assert_eq!(config.c, CustomType("registered:value".to_string()));
}

#[test]
fn test_registered_only_field() {
    /// Stands in for a foreign type that cannot implement `EnvValue` here
    #[derive(Debug, Default, PartialEq)]
    pub struct Endpoint {
        host: String,
        port: u16,
    }

    #[derive(Debug, Default, Config)]
    pub struct Client {
        #[field(registered, default = "localhost:80")]
        pub endpoint: Endpoint,
    }

    let mut registry = TypeRegistry::new();
    registry.register(|raw: &str| {
        let (host, port) = raw
            .split_once(':')
            .ok_or_else(|| ParseError::invalid(raw, "expected host:port"))?;
        let port = u16::parse_env(port)?;
        Ok::<_, ParseError>(Endpoint {
            host: host.to_string(),
            port,
        })
    });

    let client: Client = Decoder::new(MapEnv::from([("ENDPOINT", "db:5432")]))
        .registry(registry.clone())
        .decode()
        .unwrap();
    assert_eq!(
        client.endpoint,
        Endpoint {
            host: "db".to_string(),
            port: 5432
        }
    );

    let client: Client = Decoder::new(MapEnv::new())
        .registry(registry)
        .decode()
        .unwrap();
    assert_eq!(client.endpoint.port, 80);

    let err = Decoder::new(MapEnv::new())
        .registry(TypeRegistry::new())
        .decode::<Client>()
        .unwrap_err();
    assert!(err.to_string().contains("unsupported destination type: Endpoint"));
}

#[test]
fn test_byte_size_field() {
    #[derive(Debug, Default, Config)]
    pub struct Limits {
        #[field(default = "1MiB")]
        pub body: ByteSize,
    }

    let limits: Limits = decode(MapEnv::new(), "").unwrap();
    assert_eq!(limits.body, ByteSize::MIB);

    let limits: Limits = decode(MapEnv::from([("BODY", "2GiB")]), "").unwrap();
    assert_eq!(limits.body.to_string(), "2GiB");
}

#[test]
fn test_deny_unused_with_prefix() {
    #[derive(Debug, Default, Config)]
    pub struct Small {
        #[field(default = "a")]
        pub a: String,
    }

    let config: Small = Decoder::new(MapEnv::from([("PFX_A", "a"), ("UNRELATED", "hi")]))
        .prefix("PFX_")
        .deny_unused(true)
        .decode()
        .unwrap();
    assert_eq!(config.a, "a");

    let err = Decoder::new(MapEnv::from([("PFX_B", "b")]))
        .prefix("PFX_")
        .deny_unused(true)
        .decode::<Small>()
        .unwrap_err();
    assert!(
        err.to_string()
            .contains("not all defined environment variables used in config: PFX_B")
    );
}
