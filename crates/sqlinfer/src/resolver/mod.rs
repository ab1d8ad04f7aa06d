//! Maps catalog types onto target types for one generation run.
//!
//! The resolver owns the run's registry: every catalog type it has resolved,
//! every name it has handed out per package, and the enum and composite
//! declarations it has synthesized. Resolution order is:
//!
//! 1. a user override for the type's qualified or bare name
//! 2. the fixed builtin table (unmapped scalars become opaque types named after
//!    the catalog type)
//! 3. enum synthesis
//! 4. composite synthesis, resolving fields recursively
//!
//! Domains resolve to their base type and arrays to an array of their element.

use std::{
  collections::{BTreeMap, BTreeSet, HashMap},
  sync::Arc,
};

use crate::{
  catalog::{CatalogKind, CatalogType, CompositeField, Oid},
  config::Config,
  error::{Error, Result},
  naming::{Caser, choose_fallback_name, ensure_unique},
  target::{
    CompositeType, EnumType, OpaqueType, TargetType, builtin_for, extract_short_package, parse_opaque,
  },
};

const ENUM_FALLBACK_PREFIX: &str = "UnnamedEnum";
const COMPOSITE_FALLBACK_PREFIX: &str = "UnnamedComposite";
const LABEL_FALLBACK_PREFIX: &str = "UnnamedLabel";
const FIELD_FALLBACK_PREFIX: &str = "UnnamedField";

pub struct TypeResolver {
  pkg_path: String,
  pkg: String,
  caser: Caser,
  overrides: BTreeMap<String, String>,
  resolved: HashMap<Oid, TargetType>,
  /// `(package path, identifier)` to a description of whoever claimed it.
  claimed_names: HashMap<(String, String), String>,
  declarations: Vec<TargetType>,
}

impl TypeResolver {
  pub fn new(config: &Config) -> Self {
    Self {
      pkg_path: config.package_path.clone(),
      pkg: extract_short_package(&config.package_path),
      caser: config.caser(),
      overrides: config.overrides.clone(),
      resolved: HashMap::new(),
      claimed_names: HashMap::new(),
      declarations: vec![],
    }
  }

  pub fn package_path(&self) -> &str {
    &self.pkg_path
  }

  pub fn caser(&self) -> &Caser {
    &self.caser
  }

  /// Resolves a catalog type, synthesizing a declaration the first time an
  /// enum or composite is seen. Later calls for the same OID return the same
  /// target type.
  pub fn resolve(&mut self, ty: &CatalogType) -> Result<TargetType> {
    let mut visiting = Vec::new();
    self.resolve_in(ty, &mut visiting)
  }

  /// `visiting` holds the composites whose fields are being resolved,
  /// outermost first.
  fn resolve_in(&mut self, ty: &CatalogType, visiting: &mut Vec<(Oid, String)>) -> Result<TargetType> {
    if let Some(resolved) = self.resolved.get(&ty.oid) {
      return Ok(resolved.clone());
    }
    if visiting.iter().any(|(oid, _)| *oid == ty.oid) {
      let mut chain: Vec<String> = visiting.iter().map(|(_, name)| name.clone()).collect();
      chain.push(ty.name.clone());
      return Err(Error::CyclicComposite { chain });
    }

    let target = match self.resolve_override(ty)? {
      Some(overridden) => overridden,
      None => match &ty.kind {
        CatalogKind::Scalar => builtin_for(ty.oid).unwrap_or_else(|| {
          TargetType::Opaque(OpaqueType {
            pkg_path: String::new(),
            pkg: String::new(),
            name: ty.name.clone(),
          })
        }),
        CatalogKind::Pseudo => {
          return Err(Error::UnresolvableType {
            oid: ty.oid,
            name: ty.qualified_name(),
          });
        }
        CatalogKind::Enum { labels } => self.synthesize_enum(ty, labels)?,
        CatalogKind::Composite { fields } => {
          visiting.push((ty.oid, ty.name.clone()));
          let composite = self.synthesize_composite(ty, fields, visiting)?;
          visiting.pop();
          composite
        }
        CatalogKind::Domain { base } => self.resolve_in(base, visiting)?,
        CatalogKind::Array { elem } => TargetType::array(self.resolve_in(elem, visiting)?),
      },
    };

    log::debug!(
      "resolved catalog type {} to {}",
      ty.qualified_name(),
      target.qualify_rel(&self.pkg_path)
    );
    self.resolved.insert(ty.oid, target.clone());
    Ok(target)
  }

  fn resolve_override(&mut self, ty: &CatalogType) -> Result<Option<TargetType>> {
    let qualified = ty.qualified_name();
    let Some((key, value)) = self
      .overrides
      .get_key_value(&qualified)
      .or_else(|| self.overrides.get_key_value(&ty.name))
      .map(|(key, value)| (key.clone(), value.clone()))
    else {
      return Ok(None);
    };

    let opaque = parse_opaque(&value).map_err(|reason| Error::InvalidOverride {
      key,
      value: value.clone(),
      reason,
    })?;
    if !opaque.pkg_path.is_empty() {
      self.claim_name(&opaque.pkg_path, &opaque.name, owner_of(ty))?;
    }
    Ok(Some(TargetType::Opaque(opaque)))
  }

  fn synthesize_enum(&mut self, ty: &CatalogType, catalog_labels: &[String]) -> Result<TargetType> {
    let name = self.type_name(ty, ENUM_FALLBACK_PREFIX);
    let pkg_path = self.pkg_path.clone();
    self.claim_name(&pkg_path, &name, owner_of(ty))?;

    let mut labels = Vec::with_capacity(catalog_labels.len());
    for (i, label) in catalog_labels.iter().enumerate() {
      let mut ident = self.caser.to_upper_suffix(label);
      if ident.is_empty() {
        ident = choose_fallback_name(label, &format!("{LABEL_FALLBACK_PREFIX}{i}"));
      }
      let constant = format!("{name}{ident}");
      self.claim_name(&pkg_path, &constant, format!("label {label:?} of {}", owner_of(ty)))?;
      labels.push(constant);
    }

    let enum_type = TargetType::Enum(Arc::new(EnumType {
      pkg_path,
      pkg: self.pkg.clone(),
      name,
      labels,
      values: catalog_labels.to_vec(),
      source: ty.clone(),
    }));
    self.declarations.push(enum_type.clone());
    Ok(enum_type)
  }

  fn synthesize_composite(
    &mut self,
    ty: &CatalogType,
    fields: &[CompositeField],
    visiting: &mut Vec<(Oid, String)>,
  ) -> Result<TargetType> {
    let name = self.type_name(ty, COMPOSITE_FALLBACK_PREFIX);
    let pkg_path = self.pkg_path.clone();
    self.claim_name(&pkg_path, &name, owner_of(ty))?;

    let mut field_names: Vec<String> = Vec::with_capacity(fields.len());
    let mut used = BTreeSet::new();
    let mut field_types = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
      let mut ident = self.caser.to_upper_ident(&field.name);
      if ident.is_empty() {
        ident = choose_fallback_name(&field.name, &format!("{FIELD_FALLBACK_PREFIX}{i}"));
      }
      let ident = ensure_unique(&ident, "", i, &used);
      used.insert(ident.clone());
      field_names.push(ident);
      field_types.push(self.resolve_in(&field.ty, visiting)?);
    }

    let composite = TargetType::Composite(Arc::new(CompositeType {
      pkg_path,
      pkg: self.pkg.clone(),
      name,
      field_names,
      field_types,
      source: ty.clone(),
    }));
    self.declarations.push(composite.clone());
    Ok(composite)
  }

  fn type_name(&self, ty: &CatalogType, fallback_prefix: &str) -> String {
    let name = self.caser.to_upper_ident(&ty.name);
    if name.is_empty() {
      return choose_fallback_name(&ty.name, fallback_prefix);
    }
    name
  }

  /// Records that `owner` uses `name` in `pkg_path`. A name belongs to exactly
  /// one owner per run.
  fn claim_name(&mut self, pkg_path: &str, name: &str, owner: String) -> Result<()> {
    let key = (pkg_path.to_string(), name.to_string());
    match self.claimed_names.get(&key) {
      Some(existing) if *existing != owner => Err(Error::NameCollision {
        package: pkg_path.to_string(),
        name: name.to_string(),
        first: existing.clone(),
        second: owner,
      }),
      Some(_) => Ok(()),
      None => {
        self.claimed_names.insert(key, owner);
        Ok(())
      }
    }
  }

  /// Enum and composite declarations in the order they were synthesized. A
  /// composite always comes after the declarations its fields use.
  pub fn declarations(&self) -> &[TargetType] {
    &self.declarations
  }

  pub fn into_declarations(self) -> Vec<TargetType> {
    self.declarations
  }

  /// Packages, other than the generated one, that resolved types come from.
  pub fn imports(&self) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    for target in self.resolved.values() {
      target.collect_imports(&self.pkg_path, &mut imports);
    }
    imports
  }
}

fn owner_of(ty: &CatalogType) -> String {
  format!("{} (oid {})", ty.qualified_name(), ty.oid)
}

#[cfg(test)]
mod tests;
