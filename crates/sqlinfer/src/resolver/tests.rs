use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use crate::{
  catalog::{CatalogType, CompositeField, Oid, well_known},
  config::Config,
  error::Error,
  resolver::TypeResolver,
  target::{OpaqueType, TargetType},
};

const PKG_PATH: &str = "github.com/example/app";

fn resolver() -> TypeResolver {
  TypeResolver::new(&Config::builder().package_path(PKG_PATH).build())
}

fn resolver_with_overrides(overrides: &[(&str, &str)]) -> TypeResolver {
  let overrides: BTreeMap<String, String> = overrides
    .iter()
    .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
    .collect();
  TypeResolver::new(&Config::builder().package_path(PKG_PATH).overrides(overrides).build())
}

fn builtin(oid: Oid) -> CatalogType {
  well_known::scalar(oid).unwrap()
}

fn enumeration(oid: u32, name: &str, labels: &[&str]) -> CatalogType {
  CatalogType::enumeration(Oid(oid), name, labels.iter().map(|l| (*l).to_string()).collect()).with_namespace("public")
}

fn device_type() -> CatalogType {
  enumeration(16_400, "device_type", &["undefined", "phone", "ipad"])
}

#[test]
fn test_resolve_builtins() {
  let mut resolver = resolver();
  assert_eq!(resolver.resolve(&builtin(well_known::TEXT)), Ok(TargetType::builtin("string")));
  assert_eq!(resolver.resolve(&builtin(well_known::INT4)), Ok(TargetType::builtin("int32")));
  assert_eq!(
    resolver
      .resolve(&builtin(well_known::TIMESTAMPTZ))
      .map(|ty| ty.qualify_rel(PKG_PATH)),
    Ok("time.Time".to_string())
  );
  assert!(resolver.declarations().is_empty());
}

#[test]
fn test_unmapped_scalar_falls_back_to_opaque() {
  let mut resolver = resolver();
  let resolved = resolver.resolve(&builtin(well_known::NUMERIC)).unwrap();
  assert_eq!(
    resolved,
    TargetType::Opaque(OpaqueType {
      pkg_path: String::new(),
      pkg: String::new(),
      name: "numeric".to_string(),
    })
  );
}

#[test]
fn test_pseudo_types_are_unresolvable() {
  let mut resolver = resolver();
  let record = CatalogType::new(Oid(2249), "record", crate::catalog::CatalogKind::Pseudo);
  assert_eq!(
    resolver.resolve(&record),
    Err(Error::UnresolvableType {
      oid: Oid(2249),
      name: "record".to_string(),
    })
  );
}

#[test]
fn test_override_wins_over_builtin_table() {
  let mut resolver = resolver_with_overrides(&[("pg_catalog.int4", "github.com/jackc/pgtype.Int4"), ("text", "string")]);

  let int4 = resolver.resolve(&builtin(well_known::INT4)).unwrap();
  assert_eq!(int4.qualify_rel(PKG_PATH), "pgtype.Int4");
  assert_eq!(int4.import(), "github.com/jackc/pgtype");

  let text = resolver.resolve(&builtin(well_known::TEXT)).unwrap();
  assert_eq!(text.qualify_rel(PKG_PATH), "string");
  assert_eq!(text.import(), "");
}

#[test]
fn test_override_applies_to_enums() {
  let mut resolver = resolver_with_overrides(&[("public.device_type", "github.com/example/device/v2.Type")]);

  let resolved = resolver.resolve(&device_type()).unwrap();

  assert_eq!(resolved.qualify_rel(PKG_PATH), "device.Type");
  assert!(resolver.declarations().is_empty(), "overridden enums are not synthesized");
}

#[test]
fn test_shared_package_override_is_a_collision() {
  let mut resolver = resolver_with_overrides(&[
    ("text", "github.com/jackc/pgtype.Text"),
    ("varchar", "github.com/jackc/pgtype.Text"),
  ]);

  resolver.resolve(&builtin(well_known::TEXT)).unwrap();
  let err = resolver.resolve(&builtin(well_known::VARCHAR)).unwrap_err();

  assert!(
    matches!(&err, Error::NameCollision { package, name, .. } if package == "github.com/jackc/pgtype" && name == "Text"),
    "got {err:?}"
  );
}

#[test]
fn test_shared_builtin_override_is_allowed() {
  let mut resolver = resolver_with_overrides(&[("text", "string"), ("varchar", "string")]);
  assert!(resolver.resolve(&builtin(well_known::TEXT)).is_ok());
  assert!(resolver.resolve(&builtin(well_known::VARCHAR)).is_ok());
}

#[test]
fn test_invalid_override() {
  let mut resolver = resolver_with_overrides(&[("text", "github.com/foo")]);
  let err = resolver.resolve(&builtin(well_known::TEXT)).unwrap_err();
  assert!(
    matches!(&err, Error::InvalidOverride { key, value, .. } if key == "text" && value == "github.com/foo"),
    "got {err:?}"
  );
}

#[test]
fn test_enum_synthesis() {
  let mut resolver = resolver();

  let resolved = resolver.resolve(&device_type()).unwrap();

  let TargetType::Enum(enum_type) = &resolved else {
    panic!("expected enum, got {resolved:?}");
  };
  assert_eq!(enum_type.name, "DeviceType");
  assert_eq!(enum_type.pkg_path, PKG_PATH);
  assert_eq!(enum_type.pkg, "app");
  assert_eq!(
    enum_type.labels,
    vec!["DeviceTypeUndefined", "DeviceTypePhone", "DeviceTypeIpad"]
  );
  assert_eq!(enum_type.values, vec!["undefined", "phone", "ipad"]);
  assert_eq!(enum_type.source, device_type());
  assert_eq!(resolved.qualify_rel(PKG_PATH), "DeviceType");
  assert_eq!(resolved.qualify_rel("github.com/example/other"), "app.DeviceType");
  assert_eq!(resolver.declarations(), &[resolved.clone()]);
}

#[test]
fn test_enum_label_order_mirrors_catalog() {
  let mut resolver = resolver();
  let labels = ["zeta", "alpha", "mu", "beta"];

  let resolved = resolver.resolve(&enumeration(17_000, "greek", &labels)).unwrap();

  let TargetType::Enum(enum_type) = resolved else {
    panic!("expected enum");
  };
  for (i, label) in labels.iter().enumerate() {
    assert_eq!(enum_type.values[i], *label);
    assert_eq!(enum_type.labels[i], format!("Greek{}", crate::naming::Caser::new().to_upper_ident(label)));
  }
}

#[test]
fn test_resolve_is_idempotent() {
  let mut resolver = resolver();

  let first = resolver.resolve(&device_type()).unwrap();
  let second = resolver.resolve(&device_type()).unwrap();

  assert_eq!(first, second);
  let (TargetType::Enum(a), TargetType::Enum(b)) = (&first, &second) else {
    panic!("expected enums");
  };
  assert!(Arc::ptr_eq(a, b), "both calls should share one declaration");
  assert_eq!(resolver.declarations().len(), 1);
}

#[test]
fn test_enum_fallback_names() {
  let mut resolver = resolver();

  let unnamed = resolver.resolve(&enumeration(17_001, "???", &["a"])).unwrap();
  let mood = resolver.resolve(&enumeration(17_002, "mood", &["happy", "!!", "sad"])).unwrap();

  assert_eq!(unnamed.base_name(), "UnnamedEnum");
  let TargetType::Enum(mood) = mood else {
    panic!("expected enum");
  };
  assert_eq!(mood.labels, vec!["MoodHappy", "MoodUnnamedLabel1", "MoodSad"]);
  assert_eq!(mood.values, vec!["happy", "!!", "sad"]);
}

#[test]
fn test_enum_names_use_acronyms() {
  let config = Config::builder()
    .package_path(PKG_PATH)
    .acronyms(BTreeMap::from([("id".to_string(), "ID".to_string())]))
    .build();
  let mut resolver = TypeResolver::new(&config);

  let resolved = resolver.resolve(&enumeration(17_003, "id_kind", &["user_id"])).unwrap();

  let TargetType::Enum(enum_type) = resolved else {
    panic!("expected enum");
  };
  assert_eq!(enum_type.name, "IDKind");
  assert_eq!(enum_type.labels, vec!["IDKindUserID"]);
}

#[test]
fn test_distinct_enums_with_same_name_collide() {
  let mut resolver = resolver();

  resolver.resolve(&device_type()).unwrap();
  let err = resolver.resolve(&enumeration(16_500, "DeviceType", &["x"])).unwrap_err();

  assert_eq!(
    err,
    Error::NameCollision {
      package: PKG_PATH.to_string(),
      name: "DeviceType".to_string(),
      first: "public.device_type (oid 16400)".to_string(),
      second: "public.DeviceType (oid 16500)".to_string(),
    }
  );
}

#[test]
fn test_label_constants_collide_across_enums() {
  let mut resolver = resolver();

  resolver.resolve(&enumeration(17_010, "a", &["b_c"])).unwrap();
  let err = resolver.resolve(&enumeration(17_011, "a_b", &["c"])).unwrap_err();

  assert!(
    matches!(&err, Error::NameCollision { name, .. } if name == "ABC"),
    "got {err:?}"
  );
}

#[test]
fn test_composite_synthesis_resolves_fields() {
  let mut resolver = resolver();
  let email = CatalogType::domain(Oid(16_430), "email", builtin(well_known::TEXT));
  let tags = CatalogType::array(Oid(1009), "_text", builtin(well_known::TEXT));
  let device_info = CatalogType::composite(
    Oid(16_410),
    "device_info",
    vec![
      CompositeField::new("owner_email", email),
      CompositeField::new("type", device_type()),
      CompositeField::new("tags", tags),
      CompositeField::new("seen_at", builtin(well_known::TIMESTAMPTZ)),
    ],
  );

  let resolved = resolver.resolve(&device_info).unwrap();

  let TargetType::Composite(composite) = &resolved else {
    panic!("expected composite, got {resolved:?}");
  };
  assert_eq!(composite.name, "DeviceInfo");
  assert_eq!(composite.field_names, vec!["OwnerEmail", "Type", "Tags", "SeenAt"]);
  let field_types: Vec<String> = composite
    .field_types
    .iter()
    .map(|ty| ty.qualify_rel(PKG_PATH))
    .collect();
  assert_eq!(field_types, vec!["string", "DeviceType", "[]string", "time.Time"]);

  let declared: Vec<String> = resolver
    .declarations()
    .iter()
    .map(|ty| ty.base_name().into_owned())
    .collect();
  assert_eq!(declared, vec!["DeviceType", "DeviceInfo"]);
  assert_eq!(resolver.imports(), BTreeSet::from(["time".to_string()]));
}

#[test]
fn test_composite_field_names_are_disambiguated() {
  let mut resolver = resolver();
  let pair = CatalogType::composite(
    Oid(17_100),
    "pair",
    vec![
      CompositeField::new("first_name", builtin(well_known::TEXT)),
      CompositeField::new("firstName", builtin(well_known::TEXT)),
      CompositeField::new("", builtin(well_known::INT4)),
    ],
  );

  let TargetType::Composite(composite) = resolver.resolve(&pair).unwrap() else {
    panic!("expected composite");
  };
  assert_eq!(composite.field_names, vec!["FirstName", "FirstName1", "UnnamedField2"]);
}

#[test]
fn test_composite_positional_suffix_skips_taken_names() {
  let mut resolver = resolver();
  let triple = CatalogType::composite(
    Oid(17_101),
    "triple",
    vec![
      CompositeField::new("a12", builtin(well_known::INT4)),
      CompositeField::new("a1", builtin(well_known::INT4)),
      CompositeField::new("a1", builtin(well_known::INT4)),
    ],
  );

  let TargetType::Composite(composite) = resolver.resolve(&triple).unwrap() else {
    panic!("expected composite");
  };
  assert_eq!(composite.field_names, vec!["A12", "A1", "A12_2"]);
}

#[test]
fn test_digit_leading_enum_names() {
  let mut resolver = resolver();

  let resolved = resolver.resolve(&enumeration(17_003, "3d_shape", &["2d", "cube"])).unwrap();

  let TargetType::Enum(shape) = resolved else {
    panic!("expected enum");
  };
  assert_eq!(shape.name, "X3dShape");
  assert_eq!(shape.labels, vec!["X3dShape2d", "X3dShapeCube"]);
}

#[test]
fn test_nested_composites_share_declarations() {
  let mut resolver = resolver();
  let point = CatalogType::composite(
    Oid(17_200),
    "point2",
    vec![
      CompositeField::new("x", builtin(well_known::FLOAT8)),
      CompositeField::new("y", builtin(well_known::FLOAT8)),
    ],
  );
  let segment = CatalogType::composite(
    Oid(17_201),
    "segment",
    vec![
      CompositeField::new("start", point.clone()),
      CompositeField::new("end", point.clone()),
    ],
  );

  let TargetType::Composite(composite) = resolver.resolve(&segment).unwrap() else {
    panic!("expected composite");
  };
  let (TargetType::Composite(start), TargetType::Composite(end)) = (&composite.field_types[0], &composite.field_types[1])
  else {
    panic!("expected composite fields");
  };
  assert!(Arc::ptr_eq(start, end));
  assert_eq!(resolver.declarations().len(), 2);
}

#[test]
fn test_self_referential_composite_is_rejected() {
  let mut resolver = resolver();
  let inner = CatalogType::composite(Oid(17_300), "node", vec![]);
  let node = CatalogType::composite(
    Oid(17_300),
    "node",
    vec![
      CompositeField::new("id", builtin(well_known::INT4)),
      CompositeField::new("next", inner),
    ],
  );

  assert_eq!(
    resolver.resolve(&node),
    Err(Error::CyclicComposite {
      chain: vec!["node".to_string(), "node".to_string()],
    })
  );
}

#[test]
fn test_indirect_composite_cycle_is_rejected() {
  let mut resolver = resolver();
  let inner_node = CatalogType::composite(Oid(17_400), "node", vec![]);
  let edge = CatalogType::composite(
    Oid(17_401),
    "edge",
    vec![CompositeField::new(
      "targets",
      CatalogType::array(Oid(17_402), "_node", inner_node),
    )],
  );
  let node = CatalogType::composite(Oid(17_400), "node", vec![CompositeField::new("out", edge)]);

  assert_eq!(
    resolver.resolve(&node),
    Err(Error::CyclicComposite {
      chain: vec!["node".to_string(), "edge".to_string(), "node".to_string()],
    })
  );
}
