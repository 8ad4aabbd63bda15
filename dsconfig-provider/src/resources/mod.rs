//! Resources and data sources for configuration objects.
//!
//! Each object type implements [`ConfigKind`]: its schema, how a plan becomes
//! an add request, how a response becomes state, and how plan and state
//! differ. [`ConfigResource`], [`ConfigDataSource`] and
//! [`ConfigListDataSource`] drive the API with it.

use std::{collections::BTreeSet, marker::PhantomData, str::FromStr};

use async_trait::async_trait;
use dsconfig_client::{ApiError, ConfigApi, EnumParseError, Operation, UpdateRequest};
use dsconfig_resource::{
    diagnostics::Diagnostics,
    framework::{DataSource, Resource},
    import::split_import_id,
    schema::{Attribute, Schema, TYPE_ATTRIBUTE},
    validate::validate_planned_values,
    value::{Attr, AttributeModel, AttributeValues},
};

use crate::provider::ProviderData;

pub mod certificate_mapper;
pub mod delegated_admin_resource_rights;
pub mod log_field_behavior;
pub mod rest_resource_type;
pub mod scim_subattribute;

#[cfg(test)]
pub(crate) mod test_support;

/// Whether a resource owns its object, or adopts one that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Creates the object and deletes it on destroy.
    Managed,
    /// Manages an object that always exists on the server. Create only
    /// updates it; destroy only stops tracking it.
    Default,
}

/// One configuration object type.
#[async_trait]
pub trait ConfigKind: Send + Sync + 'static {
    type Model: AttributeModel + Clone + Default + Send + Sync;
    type AddRequest: Send + Sync;
    type Response: Send + Sync;

    /// Resource type name suffix, e.g. `certificate_mapper`.
    const KIND: &'static str;
    /// Name suffix of the list data source, e.g. `certificate_mappers`.
    const LIST_NAME: &'static str;
    /// For messages, e.g. `Certificate Mapper`.
    const DISPLAY_NAME: &'static str;
    /// Attributes naming an object with their import labels, outermost
    /// first. The last one is the object's own name.
    const KEYS: &'static [(&'static str, &'static str)];
    /// Whether the object type has subtypes, selected by `type`.
    const POLYMORPHIC: bool;

    fn schema() -> Schema;

    /// Build the add request for a plan. Report problems and return `None`
    /// if the plan can't be expressed.
    fn build_add_request(
        keys: &ObjectKeys,
        plan: &Self::Model,
        diags: &mut Diagnostics,
    ) -> Option<Self::AddRequest>;

    async fn get(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<Self::Response, ApiError>;

    async fn add(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &Self::AddRequest,
    ) -> Result<Self::Response, ApiError>;

    async fn update(
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        request: &UpdateRequest,
    ) -> Result<Self::Response, ApiError>;

    async fn delete(api: &dyn ConfigApi, keys: &ObjectKeys) -> Result<(), ApiError>;

    /// List the objects below the parents named by `parents`.
    async fn list(
        api: &dyn ConfigApi,
        parents: &ObjectKeys,
        filter: Option<&str>,
    ) -> Result<Vec<Self::Response>, ApiError>;

    fn response_id(response: &Self::Response) -> &str;

    /// The subtype tag of a response, for polymorphic kinds.
    fn response_type(_response: &Self::Response) -> Option<&'static str> {
        None
    }

    /// Overwrite `model` with a response. The model's current values are the
    /// expected ones for null normalization; its key attributes are kept.
    fn read_response(response: &Self::Response, model: &mut Self::Model);

    /// Operations taking `state` to `plan`, in declaration order.
    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation>;

    /// Checks the schema can't express.
    fn validate_config(_config: &AttributeValues, _diags: &mut Diagnostics) {}

    /// Attributes that keep their declaration in [`Variant::Default`] schemas.
    fn identifying_attributes() -> Vec<&'static str> {
        let mut attributes: Vec<&'static str> = Self::KEYS.iter().map(|(a, _)| *a).collect();
        if Self::POLYMORPHIC {
            attributes.push(TYPE_ATTRIBUTE);
        }
        attributes
    }
}

/// The names locating one object, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKeys(Vec<String>);

impl ObjectKeys {
    pub fn new(keys: Vec<String>) -> Self {
        ObjectKeys(keys)
    }

    /// Read the key attributes, which must be known.
    pub fn from_values(
        values: &AttributeValues,
        keys: &[(&str, &str)],
        diags: &mut Diagnostics,
    ) -> Option<Self> {
        let mut segments = Vec::with_capacity(keys.len());
        for (attribute, _) in keys {
            match values.get::<String>(attribute) {
                Ok(Attr::Known(value)) => segments.push(value),
                _ => {
                    diags.attribute_error(
                        attribute,
                        "Missing object identifier",
                        format!("{:?} must be known to locate the object.", attribute),
                    );
                    return None;
                }
            }
        }
        Some(ObjectKeys::new(segments))
    }

    /// The object's own name.
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// The `i`th enclosing object's name.
    pub fn parent(&self, i: usize) -> &str {
        self.0.get(i).map(String::as_str).unwrap_or_default()
    }
}

/// Report a failed API call.
pub(crate) fn report_api_error(diags: &mut Diagnostics, summary: String, error: &ApiError) {
    let detail = match error {
        ApiError::Status { body, .. } => format!("{}\nResponse body: {}", error, body),
        _ => error.to_string(),
    };
    diags.error(summary, detail);
}

/// Parse an enum attribute. Null and unknown give `None`; invalid values
/// are reported.
pub(crate) fn parse_enum<T>(
    diags: &mut Diagnostics,
    attribute: &str,
    value: &Attr<String>,
) -> Option<T>
where
    T: FromStr<Err = EnumParseError>,
{
    let value = value.known()?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            diags.attribute_error(attribute, "Invalid attribute value", e.to_string());
            None
        }
    }
}

/// Like [`parse_enum`], reporting an error if the value is missing too.
pub(crate) fn required_enum<T>(
    diags: &mut Diagnostics,
    attribute: &str,
    value: &Attr<String>,
) -> Option<T>
where
    T: FromStr<Err = EnumParseError>,
{
    required(diags, attribute, value)?;
    parse_enum(diags, attribute, value)
}

pub(crate) fn parse_enum_set<T>(
    diags: &mut Diagnostics,
    attribute: &str,
    value: &Attr<BTreeSet<String>>,
) -> Vec<T>
where
    T: FromStr<Err = EnumParseError>,
{
    value
        .known()
        .into_iter()
        .flatten()
        .filter_map(|v| match v.parse() {
            Ok(v) => Some(v),
            Err(e) => {
                diags.attribute_error(attribute, "Invalid attribute value", format!("{}", e));
                None
            }
        })
        .collect()
}

/// A value the add request can't do without. Reports it if missing.
pub(crate) fn required<T: Clone>(
    diags: &mut Diagnostics,
    attribute: &str,
    value: &Attr<T>,
) -> Option<T> {
    let value = value.known().cloned();
    if value.is_none() {
        diags.attribute_error(
            attribute,
            "Missing required argument",
            format!("{:?} is required for this type.", attribute),
        );
    }
    value
}

pub(crate) fn optional_string(value: &Attr<String>) -> Option<String> {
    value.known().filter(|v| !v.is_empty()).cloned()
}

pub(crate) fn string_vec(value: &Attr<BTreeSet<String>>) -> Vec<String> {
    value.known().into_iter().flatten().cloned().collect()
}

/// The `id` attribute every resource carries.
pub(crate) fn id_attribute() -> Attribute {
    Attribute::string("The ID of this resource.")
        .computed()
        .use_state_for_unknown()
}

fn decode<M: AttributeModel>(values: &AttributeValues, diags: &mut Diagnostics) -> Option<M> {
    match M::from_values(values) {
        Ok(model) => Some(model),
        Err(e) => {
            diags.error_chain("Unable to decode attribute values", &e);
            None
        }
    }
}

fn planned_type(values: &AttributeValues) -> Option<String> {
    values
        .get::<String>(TYPE_ATTRIBUTE)
        .ok()
        .and_then(|t| t.known().cloned())
}

pub struct ConfigResource<K> {
    variant: Variant,
    kind: PhantomData<fn() -> K>,
}

impl<K: ConfigKind> ConfigResource<K> {
    pub fn new(variant: Variant) -> Self {
        ConfigResource {
            variant,
            kind: PhantomData,
        }
    }

    pub fn boxed(variant: Variant) -> Box<dyn Resource<ProviderData>> {
        Box::new(Self::new(variant))
    }

    /// Reject planned values the server would not accept. Updates and
    /// adopted objects never build a typed request, so this stands in for
    /// its enum parsing.
    fn check_plan(&self, planned: &AttributeValues, diags: &mut Diagnostics) -> bool {
        validate_planned_values(&self.schema(), planned, diags);
        if !diags.has_errors() {
            K::validate_config(planned, diags);
        }
        !diags.has_errors()
    }

    async fn create_managed(
        &self,
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        plan: &K::Model,
        diags: &mut Diagnostics,
    ) -> Option<K::Model> {
        let request = K::build_add_request(keys, plan, diags)?;
        if diags.has_errors() {
            return None;
        }
        let response = match K::add(api, keys, &request).await {
            Ok(r) => r,
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to create the {}", K::DISPLAY_NAME),
                    &e,
                );
                return None;
            }
        };
        let mut state = plan.clone();
        K::read_response(&response, &mut state);
        Some(state)
    }

    /// Take over an existing object and apply the plan to it.
    async fn create_default(
        &self,
        api: &dyn ConfigApi,
        keys: &ObjectKeys,
        plan: &K::Model,
        planned_type: Option<&str>,
        diags: &mut Diagnostics,
    ) -> Option<K::Model> {
        let existing = match K::get(api, keys).await {
            Ok(r) => r,
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to read the {}", K::DISPLAY_NAME),
                    &e,
                );
                return None;
            }
        };
        if let (Some(planned), Some(actual)) = (planned_type, K::response_type(&existing)) {
            if planned != actual {
                diags.attribute_error(
                    TYPE_ATTRIBUTE,
                    "Type mismatch",
                    format!(
                        "The existing {} {:?} has type {:?}, but the plan has type {:?}.",
                        K::DISPLAY_NAME,
                        keys.name(),
                        actual,
                        planned
                    ),
                );
                return None;
            }
        }

        let mut state = plan.clone();
        K::read_response(&existing, &mut state);

        let operations = K::create_operations(plan, &state);
        if operations.is_empty() {
            tracing::info!(kind = K::KIND, name = keys.name(), "no configuration changes to apply");
            return Some(state);
        }
        let response = match K::update(api, keys, &UpdateRequest::new(operations)).await {
            Ok(r) => r,
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to update the {}", K::DISPLAY_NAME),
                    &e,
                );
                return None;
            }
        };
        K::read_response(&response, &mut state);
        Some(state)
    }
}

#[async_trait]
impl<K: ConfigKind> Resource<ProviderData> for ConfigResource<K> {
    fn type_name(&self) -> String {
        match self.variant {
            Variant::Managed => format!("dsconfig_{}", K::KIND),
            Variant::Default => format!("dsconfig_default_{}", K::KIND),
        }
    }

    fn schema(&self) -> Schema {
        match self.variant {
            Variant::Managed => K::schema(),
            Variant::Default => K::schema().for_existing_objects(&K::identifying_attributes()),
        }
    }

    fn validate_config(&self, config: &AttributeValues, diags: &mut Diagnostics) {
        K::validate_config(config, diags);
    }

    async fn create(
        &self,
        api: &ProviderData,
        planned: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues> {
        let plan: K::Model = decode(planned, diags)?;
        let keys = ObjectKeys::from_values(planned, K::KEYS, diags)?;
        let state = match self.variant {
            Variant::Managed => self.create_managed(api.as_ref(), &keys, &plan, diags).await,
            Variant::Default => {
                if !self.check_plan(planned, diags) {
                    return None;
                }
                let planned_type = planned_type(planned);
                self.create_default(api.as_ref(), &keys, &plan, planned_type.as_deref(), diags)
                    .await
            }
        }?;
        Some(state.to_values())
    }

    async fn read(
        &self,
        api: &ProviderData,
        state: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues> {
        let mut model: K::Model = decode(state, diags)?;
        let keys = ObjectKeys::from_values(state, K::KEYS, diags)?;
        match K::get(api.as_ref(), &keys).await {
            Ok(response) => {
                K::read_response(&response, &mut model);
                Some(model.to_values())
            }
            Err(e) if e.is_not_found() && self.variant == Variant::Managed => {
                tracing::warn!(kind = K::KIND, name = keys.name(), "object not found, removing from state");
                diags.warning(
                    format!("{} not found", K::DISPLAY_NAME),
                    format!(
                        "The {} {:?} could not be found on the server. It will be removed from the state.",
                        K::DISPLAY_NAME,
                        keys.name()
                    ),
                );
                None
            }
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to read the {}", K::DISPLAY_NAME),
                    &e,
                );
                None
            }
        }
    }

    async fn update(
        &self,
        api: &ProviderData,
        prior: &AttributeValues,
        planned: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues> {
        let plan: K::Model = decode(planned, diags)?;
        let state: K::Model = decode(prior, diags)?;
        let keys = ObjectKeys::from_values(planned, K::KEYS, diags)?;
        if !self.check_plan(planned, diags) {
            return None;
        }

        let operations = K::create_operations(&plan, &state);
        if operations.is_empty() {
            tracing::info!(kind = K::KIND, name = keys.name(), "no configuration changes to apply");
            let mut new_state = planned.clone();
            new_state.resolve_unknowns_from(prior);
            return Some(new_state);
        }

        let response = match K::update(api.as_ref(), &keys, &UpdateRequest::new(operations)).await {
            Ok(r) => r,
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to update the {}", K::DISPLAY_NAME),
                    &e,
                );
                return None;
            }
        };
        let mut new_state = plan;
        K::read_response(&response, &mut new_state);
        Some(new_state.to_values())
    }

    async fn delete(&self, api: &ProviderData, state: &AttributeValues, diags: &mut Diagnostics) {
        if self.variant == Variant::Default {
            // the object stays; it is only no longer tracked
            return;
        }
        let Some(keys) = ObjectKeys::from_values(state, K::KEYS, diags) else {
            return;
        };
        match K::delete(api.as_ref(), &keys).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(kind = K::KIND, name = keys.name(), "already deleted");
            }
            Err(e) => report_api_error(
                diags,
                format!("An error occurred while trying to delete the {}", K::DISPLAY_NAME),
                &e,
            ),
        }
    }

    fn import_state(&self, id: &str, diags: &mut Diagnostics) -> Option<AttributeValues> {
        split_import_id(id, K::KEYS, diags)
    }
}

/// Reads one object by its keys.
pub struct ConfigDataSource<K>(PhantomData<fn() -> K>);

impl<K: ConfigKind> ConfigDataSource<K> {
    pub fn boxed() -> Box<dyn DataSource<ProviderData>> {
        Box::new(ConfigDataSource::<K>(PhantomData))
    }
}

#[async_trait]
impl<K: ConfigKind> DataSource<ProviderData> for ConfigDataSource<K> {
    fn type_name(&self) -> String {
        format!("dsconfig_{}", K::KIND)
    }

    fn schema(&self) -> Schema {
        let keys: Vec<&str> = K::KEYS.iter().map(|(a, _)| *a).collect();
        let mut schema = K::schema().for_data_source(&keys);
        schema.description = Some(format!("Describes a {}.", K::DISPLAY_NAME));
        schema
    }

    async fn read(
        &self,
        api: &ProviderData,
        config: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues> {
        let mut model: K::Model = decode(config, diags)?;
        let keys = ObjectKeys::from_values(config, K::KEYS, diags)?;
        match K::get(api.as_ref(), &keys).await {
            Ok(response) => {
                K::read_response(&response, &mut model);
                Some(model.to_values())
            }
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to read the {}", K::DISPLAY_NAME),
                    &e,
                );
                None
            }
        }
    }
}

/// Lists the ids of the objects of a collection.
pub struct ConfigListDataSource<K>(PhantomData<fn() -> K>);

impl<K: ConfigKind> ConfigListDataSource<K> {
    pub fn boxed() -> Box<dyn DataSource<ProviderData>> {
        Box::new(ConfigListDataSource::<K>(PhantomData))
    }

    fn parent_keys() -> &'static [(&'static str, &'static str)] {
        &K::KEYS[..K::KEYS.len().saturating_sub(1)]
    }
}

#[async_trait]
impl<K: ConfigKind> DataSource<ProviderData> for ConfigListDataSource<K> {
    fn type_name(&self) -> String {
        format!("dsconfig_{}", K::LIST_NAME)
    }

    fn schema(&self) -> Schema {
        let source = K::schema();
        let mut schema = Schema::new(&format!("Lists {} objects.", K::DISPLAY_NAME))
            .attribute(
                "filter",
                Attribute::string("SCIM filter used when searching the server's objects."),
            )
            .attribute(
                "ids",
                Attribute::string_set("Names of the objects found.").computed(),
            );
        for (attribute, _) in Self::parent_keys() {
            if let Some(declared) = source.get(attribute) {
                let mut declared = declared.clone();
                declared.plan_modifiers.clear();
                schema = schema.attribute(attribute, declared);
            }
        }
        schema
    }

    async fn read(
        &self,
        api: &ProviderData,
        config: &AttributeValues,
        diags: &mut Diagnostics,
    ) -> Option<AttributeValues> {
        let parents = ObjectKeys::from_values(config, Self::parent_keys(), diags)?;
        let filter: Attr<String> = match config.get("filter") {
            Ok(f) => f,
            Err(e) => {
                diags.error_chain("Unable to decode attribute values", &e);
                return None;
            }
        };
        let responses = match K::list(api.as_ref(), &parents, filter.as_deref()).await {
            Ok(r) => r,
            Err(e) => {
                report_api_error(
                    diags,
                    format!("An error occurred while trying to list {} objects", K::DISPLAY_NAME),
                    &e,
                );
                return None;
            }
        };
        let ids: BTreeSet<String> = responses
            .iter()
            .map(|r| K::response_id(r).to_string())
            .collect();
        let mut state = config.clone();
        state.set("ids", &Attr::Known(ids));
        Some(state)
    }
}

/// All resources for `K`: managed and default.
pub(crate) fn resources<K: ConfigKind>() -> Vec<Box<dyn Resource<ProviderData>>> {
    vec![
        ConfigResource::<K>::boxed(Variant::Managed),
        ConfigResource::<K>::boxed(Variant::Default),
    ]
}

/// All data sources for `K`: one object, and the list.
pub(crate) fn data_sources<K: ConfigKind>() -> Vec<Box<dyn DataSource<ProviderData>>> {
    vec![ConfigDataSource::<K>::boxed(), ConfigListDataSource::<K>::boxed()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys() {
        let values = AttributeValues::new()
            .with("delegated_admin_rights_name", "rights1")
            .with("rest_resource_type", "users");
        let mut diags = Diagnostics::new();
        let keys = ObjectKeys::from_values(
            &values,
            &[
                ("delegated_admin_rights_name", "delegated-admin-rights-name"),
                ("rest_resource_type", "rest-resource-type"),
            ],
            &mut diags,
        )
        .unwrap();
        assert_eq!(keys.name(), "users");
        assert_eq!(keys.parent(0), "rights1");
        assert_eq!(ObjectKeys::new(vec![]).name(), "");
    }

    #[test]
    fn unknown_keys_are_reported() {
        let mut values = AttributeValues::new();
        values.mark_unknown("name");
        let mut diags = Diagnostics::new();
        assert!(ObjectKeys::from_values(&values, &[("name", "name")], &mut diags).is_none());
        assert!(diags.has_errors());
    }

    #[test]
    fn enum_parsing() {
        use dsconfig_client::models::certificate_mapper::FingerprintAlgorithm;

        let mut diags = Diagnostics::new();
        let parsed: Option<FingerprintAlgorithm> =
            parse_enum(&mut diags, "fingerprint_algorithm", &Attr::Known("sha-1".to_string()));
        assert_eq!(parsed, None);
        let d = diags.iter().next().unwrap();
        assert_eq!(d.attribute.as_deref(), Some("fingerprint_algorithm"));
        assert!(d.detail.contains("\"sha-1\""), "{}", d.detail);

        let mut diags = Diagnostics::new();
        let parsed: Option<FingerprintAlgorithm> =
            parse_enum(&mut diags, "fingerprint_algorithm", &Attr::Null);
        assert_eq!(parsed, None);
        assert!(diags.is_empty());

        let missing: Option<FingerprintAlgorithm> =
            required_enum(&mut diags, "fingerprint_algorithm", &Attr::Null);
        assert_eq!(missing, None);
        assert!(diags.has_errors());
    }
}
