//! Two-tier reference data resolver
//!
//! Primary tier is Postgres; fallback tier is the built-in research
//! catalog. Resolution always produces something usable: a missing
//! phenology record degrades through crop-level GDD targets down to the
//! generic defaults, and the result records how degraded it is so the
//! predictor can lower confidence instead of failing.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use shared::models::{
    ClimateZone, CropPhenology, CultivarQualityProfile, GddTargets, GrowingRegion,
    HeritageIntent, MaturityType, QualityTier, RipeningBehavior, Rootstock,
};
use shared::predictor::ResolvedReferences;

use crate::error::AppResult;
use crate::reference::cache::{Clock, TtlCache};
use crate::reference::catalog;

/// A tier that can look up reference records. Lookups return `None`
/// for records the tier does not know; errors are reserved for the
/// tier itself failing.
pub trait ReferenceSource: Send + Sync {
    fn cultivar(
        &self,
        cultivar_id: &str,
    ) -> impl std::future::Future<Output = AppResult<Option<CultivarQualityProfile>>> + Send;
    fn rootstock(
        &self,
        rootstock_id: &str,
    ) -> impl std::future::Future<Output = AppResult<Option<Rootstock>>> + Send;
    fn phenology(
        &self,
        crop_id: &str,
        region_id: &str,
    ) -> impl std::future::Future<Output = AppResult<Option<CropPhenology>>> + Send;
    fn gdd_targets(
        &self,
        crop_id: &str,
    ) -> impl std::future::Future<Output = AppResult<Option<GddTargets>>> + Send;
    fn region(
        &self,
        region_id: &str,
    ) -> impl std::future::Future<Output = AppResult<Option<GrowingRegion>>> + Send;
}

/// Database row for cultivar quality profiles
#[derive(Debug, sqlx::FromRow)]
struct CultivarRow {
    cultivar_id: String,
    cultivar_name: String,
    crop_id: String,
    tier: String,
    heritage_intent: String,
    avg_brix: Option<f64>,
    peak_brix: Option<f64>,
    maturity: String,
    ripening: String,
}

impl From<CultivarRow> for CultivarQualityProfile {
    fn from(row: CultivarRow) -> Self {
        CultivarQualityProfile {
            cultivar_id: row.cultivar_id,
            cultivar_name: row.cultivar_name,
            crop_id: row.crop_id,
            tier: QualityTier::from_str(&row.tier),
            heritage_intent: heritage_intent_from_str(&row.heritage_intent),
            avg_brix: row.avg_brix,
            peak_brix: row.peak_brix,
            maturity: maturity_from_str(&row.maturity),
            ripening: ripening_from_str(&row.ripening),
        }
    }
}

fn heritage_intent_from_str(s: &str) -> HeritageIntent {
    match s {
        "flavor_bred" => HeritageIntent::FlavorBred,
        "nutrition_bred" => HeritageIntent::NutritionBred,
        "dual_purpose" => HeritageIntent::DualPurpose,
        "yield_shipping" => HeritageIntent::YieldShipping,
        _ => HeritageIntent::Unknown,
    }
}

fn maturity_from_str(s: &str) -> MaturityType {
    match s {
        "early_season" => MaturityType::EarlySeason,
        "late_season" => MaturityType::LateSeason,
        _ => MaturityType::MidSeason,
    }
}

fn ripening_from_str(s: &str) -> RipeningBehavior {
    match s {
        "climacteric" => RipeningBehavior::Climacteric,
        _ => RipeningBehavior::NonClimacteric,
    }
}

fn climate_zone_from_str(s: &str) -> ClimateZone {
    match s {
        "tropical" => ClimateZone::Tropical,
        "subtropical" => ClimateZone::Subtropical,
        "arid" => ClimateZone::Arid,
        "continental" => ClimateZone::Continental,
        _ => ClimateZone::Temperate,
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RootstockRow {
    rootstock_id: String,
    rootstock_name: String,
    brix_modifier: f64,
    vigor: Option<String>,
    disease_notes: Option<String>,
}

impl From<RootstockRow> for Rootstock {
    fn from(row: RootstockRow) -> Self {
        Rootstock {
            rootstock_id: row.rootstock_id,
            rootstock_name: row.rootstock_name,
            brix_modifier: row.brix_modifier,
            vigor: row.vigor,
            disease_notes: row.disease_notes,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PhenologyRow {
    crop_id: String,
    region_id: String,
    bloom_month: i32,
    bloom_day: i32,
    gdd_base_temp_f: f64,
    gdd_to_maturity: f64,
    gdd_to_peak: f64,
    gdd_window_width: f64,
    chill_hours_required: Option<f64>,
}

impl From<PhenologyRow> for CropPhenology {
    fn from(row: PhenologyRow) -> Self {
        CropPhenology {
            crop_id: row.crop_id,
            region_id: row.region_id,
            bloom_month: row.bloom_month as u32,
            bloom_day: row.bloom_day as u32,
            gdd_base_temp_f: row.gdd_base_temp_f,
            gdd_to_maturity: row.gdd_to_maturity,
            gdd_to_peak: row.gdd_to_peak,
            gdd_window_width: row.gdd_window_width,
            chill_hours_required: row.chill_hours_required,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GddTargetRow {
    crop_id: String,
    base_temp_f: f64,
    gdd_to_maturity: f64,
    gdd_to_peak: f64,
    gdd_window_width: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct RegionRow {
    region_id: String,
    name: String,
    climate_zone: String,
    latitude: Option<rust_decimal::Decimal>,
    longitude: Option<rust_decimal::Decimal>,
}

/// Postgres reference tier
#[derive(Clone)]
pub struct PgReferenceSource {
    db: PgPool,
}

impl PgReferenceSource {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl ReferenceSource for PgReferenceSource {
    async fn cultivar(&self, cultivar_id: &str) -> AppResult<Option<CultivarQualityProfile>> {
        let row = sqlx::query_as::<_, CultivarRow>(
            r#"
            SELECT cultivar_id, cultivar_name, crop_id, tier, heritage_intent,
                   avg_brix, peak_brix, maturity, ripening
            FROM cultivar_profiles
            WHERE cultivar_id = $1
            "#,
        )
        .bind(cultivar_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn rootstock(&self, rootstock_id: &str) -> AppResult<Option<Rootstock>> {
        let row = sqlx::query_as::<_, RootstockRow>(
            r#"
            SELECT rootstock_id, rootstock_name, brix_modifier, vigor, disease_notes
            FROM rootstocks
            WHERE rootstock_id = $1
            "#,
        )
        .bind(rootstock_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn phenology(&self, crop_id: &str, region_id: &str) -> AppResult<Option<CropPhenology>> {
        let row = sqlx::query_as::<_, PhenologyRow>(
            r#"
            SELECT crop_id, region_id, bloom_month, bloom_day, gdd_base_temp_f,
                   gdd_to_maturity, gdd_to_peak, gdd_window_width, chill_hours_required
            FROM crop_phenology
            WHERE crop_id = $1 AND region_id = $2
            "#,
        )
        .bind(crop_id)
        .bind(region_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn gdd_targets(&self, crop_id: &str) -> AppResult<Option<GddTargets>> {
        let row = sqlx::query_as::<_, GddTargetRow>(
            r#"
            SELECT crop_id, base_temp_f, gdd_to_maturity, gdd_to_peak, gdd_window_width
            FROM crop_gdd_targets
            WHERE crop_id = $1
            "#,
        )
        .bind(crop_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|r| GddTargets {
            crop_id: r.crop_id,
            base_temp_f: r.base_temp_f,
            gdd_to_maturity: r.gdd_to_maturity,
            gdd_to_peak: r.gdd_to_peak,
            gdd_window_width: r.gdd_window_width,
        }))
    }

    async fn region(&self, region_id: &str) -> AppResult<Option<GrowingRegion>> {
        let row = sqlx::query_as::<_, RegionRow>(
            r#"
            SELECT region_id, name, climate_zone, latitude, longitude
            FROM growing_regions
            WHERE region_id = $1
            "#,
        )
        .bind(region_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|r| {
            let coordinates = match (r.latitude, r.longitude) {
                (Some(lat), Some(lon)) => Some(shared::types::GpsCoordinates::new(lat, lon)),
                _ => None,
            };
            GrowingRegion {
                region_id: r.region_id,
                name: r.name,
                climate_zone: climate_zone_from_str(&r.climate_zone),
                coordinates,
            }
        }))
    }
}

/// Cache key covering every id a resolution depends on
type ResolutionKey = (String, String, String, Option<String>);

/// Two-tier resolver with a TTL cache in front.
///
/// Primary source first, built-in catalog second, generic defaults
/// last. The resolved bundle is cached whole so one prediction request
/// costs at most one resolution.
pub struct ReferenceResolver<S: ReferenceSource> {
    primary: S,
    cache: TtlCache<ResolutionKey, ResolvedReferences>,
}

impl<S: ReferenceSource> ReferenceResolver<S> {
    pub fn new(primary: S, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            primary,
            cache: TtlCache::new(clock, ttl),
        }
    }

    /// Resolve every reference a prediction needs.
    ///
    /// Lookup order per record: primary source, then the built-in
    /// catalog. Phenology additionally degrades through crop-level GDD
    /// targets before reaching the generic defaults; only the generic
    /// tier marks the result as degraded.
    pub async fn resolve(
        &self,
        cultivar_id: &str,
        crop_id: &str,
        region_id: &str,
        rootstock_id: Option<&str>,
    ) -> AppResult<ResolvedReferences> {
        let key = (
            cultivar_id.to_string(),
            crop_id.to_string(),
            region_id.to_string(),
            rootstock_id.map(str::to_string),
        );
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let cultivar = match self.primary.cultivar(cultivar_id).await? {
            Some(profile) => Some(profile),
            None => catalog::cultivar(cultivar_id),
        };

        let rootstock = match rootstock_id {
            Some(id) => match self.primary.rootstock(id).await? {
                Some(stock) => Some(stock),
                None => catalog::rootstock(id),
            },
            None => None,
        };

        let region = self.region(region_id).await?;
        let climate_zone = region.as_ref().map(|r| r.climate_zone);
        let coordinates = region.and_then(|r| r.coordinates);

        let (phenology, phenology_degraded) = self.resolve_phenology(crop_id, region_id).await?;

        let resolved = ResolvedReferences {
            cultivar,
            rootstock,
            phenology,
            phenology_degraded,
            climate_zone,
            coordinates,
        };
        self.cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Resolve a growing region on its own, primary source first
    pub async fn region(&self, region_id: &str) -> AppResult<Option<GrowingRegion>> {
        match self.primary.region(region_id).await? {
            Some(region) => Ok(Some(region)),
            None => Ok(catalog::region(region_id)),
        }
    }

    /// Resolve phenology on its own; the flag is true when only the
    /// generic defaults were available
    pub async fn resolve_phenology(
        &self,
        crop_id: &str,
        region_id: &str,
    ) -> AppResult<(CropPhenology, bool)> {
        if let Some(record) = self.primary.phenology(crop_id, region_id).await? {
            return Ok((record, false));
        }
        if let Some(record) = catalog::phenology(crop_id, region_id) {
            return Ok((record, false));
        }

        // Crop is known but the region is not: promote crop-level
        // targets with the crop's typical bloom date
        let targets = match self.primary.gdd_targets(crop_id).await? {
            Some(targets) => Some(targets),
            None => catalog::gdd_targets(crop_id),
        };
        if let Some(targets) = targets {
            let (bloom_month, bloom_day) = catalog::default_bloom(crop_id);
            return Ok((targets.into_phenology(region_id, bloom_month, bloom_day), false));
        }

        tracing::warn!(crop_id, region_id, "no phenology resolvable, using generic defaults");
        Ok((CropPhenology::generic_default(crop_id, region_id), true))
    }
}
