use std::collections::HashMap;

use super::{CatalogKind, CatalogType, CompositeField, Oid, well_known};
use crate::{
  engine::{Engine, TypeClass},
  error::{Error, Result},
};

/// Builds [`CatalogType`] trees from engine lookups and caches them by OID for
/// one run.
///
/// Well-known builtin types are answered locally without a round trip.
#[derive(Debug, Default)]
pub struct TypeFetcher {
  cache: HashMap<Oid, CatalogType>,
}

impl TypeFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn fetch<E: Engine>(&mut self, engine: &mut E, oid: Oid) -> Result<CatalogType> {
    let mut chain = Vec::new();
    self.fetch_in(engine, oid, &mut chain).await
  }

  /// `chain` holds the types currently being expanded, outermost first. Meeting
  /// one of them again means the type contains itself.
  async fn fetch_in<E: Engine>(
    &mut self,
    engine: &mut E,
    oid: Oid,
    chain: &mut Vec<(Oid, String)>,
  ) -> Result<CatalogType> {
    if let Some(cached) = self.cache.get(&oid) {
      return Ok(cached.clone());
    }
    if let Some(builtin) = well_known::scalar(oid) {
      self.cache.insert(oid, builtin.clone());
      return Ok(builtin);
    }

    let header = engine.fetch_type(oid).await.map_err(|e| Error::from_lookup(oid, e))?;
    if chain.iter().any(|(seen, _)| *seen == oid) {
      let mut names: Vec<String> = chain.iter().map(|(_, name)| name.clone()).collect();
      names.push(header.name);
      return Err(Error::CyclicComposite { chain: names });
    }
    chain.push((oid, header.name.clone()));

    let kind = match header.class {
      TypeClass::Scalar => CatalogKind::Scalar,
      TypeClass::Pseudo => CatalogKind::Pseudo,
      TypeClass::Enum => {
        let labels = engine
          .fetch_enum_def(oid)
          .await
          .map_err(|e| Error::from_lookup(oid, e))?;
        CatalogKind::Enum { labels }
      }
      TypeClass::Composite => {
        let defs = engine
          .fetch_composite_def(oid)
          .await
          .map_err(|e| Error::from_lookup(oid, e))?;
        let mut fields = Vec::with_capacity(defs.len());
        for (name, field_oid) in defs {
          let ty = Box::pin(self.fetch_in(engine, field_oid, chain)).await?;
          fields.push(CompositeField::new(name, ty));
        }
        CatalogKind::Composite { fields }
      }
      TypeClass::Domain { base } => {
        let base = Box::pin(self.fetch_in(engine, base, chain)).await?;
        CatalogKind::Domain { base: Box::new(base) }
      }
      TypeClass::Array { elem } => {
        let elem = Box::pin(self.fetch_in(engine, elem, chain)).await?;
        CatalogKind::Array { elem: Box::new(elem) }
      }
    };
    chain.pop();

    let ty = CatalogType {
      oid,
      name: header.name,
      namespace: header.namespace,
      kind,
    };
    log::debug!("fetched catalog type {} (oid {oid})", ty.qualified_name());
    self.cache.insert(oid, ty.clone());
    Ok(ty)
  }

  pub fn len(&self) -> usize {
    self.cache.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cache.is_empty()
  }
}
