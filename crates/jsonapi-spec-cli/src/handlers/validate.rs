//! Validation command handler and related utilities

use crate::cli::{ValidateArgs, ValidationMode};
use crate::config::{Config, FileFormat};
use crate::error::{Error, Result};
use crate::log_with_request_id;
use crate::logging::{redaction, timing::Timer};
use crate::output::{OutputWriter, ValidationReport};
use jsonapi_spec::{
    Cardinality, DocumentValidator, IdPolicy, RelationshipDocumentValidator, RelationshipRules,
    ResourceStore, ResourceValidator, ValidationContext, ValidationErrors,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(documents = args.documents.len(), mode = ?args.mode))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("validate_command", &format!("{} document(s)", args.documents.len()));
    info!("Starting validation process");

    let endpoint = Endpoint::from_args(&args, config)?;
    let store = config.store(args.store.as_deref())?;
    output.debug(&format!("Validating against {} resource(s) in the store", store.len()))?;

    let progress = if args.documents.len() > 1 && config.output.progress {
        output.progress_bar(args.documents.len() as u64, "Validating documents")
    } else {
        None
    };

    let mut report = ValidationReport::default();
    for path in &args.documents {
        output.info(&format!("Validating document: {}", path.display()))?;

        let document = read_document(path)?;
        let errors = {
            let _validation_timer = Timer::with_details("document_validation", &path.display().to_string());
            endpoint.validate(&document, &store)?
        };

        if errors.is_empty() {
            debug!(path = %path.display(), "Document is valid");
        } else {
            warn!(path = %path.display(), errors = errors.len(), "Document failed validation");
        }

        // Redact sensitive information before displaying
        let echoed = (args.detailed && !errors.is_empty()).then(|| {
            let mut redacted = document.clone();
            redaction::redact_json_value(&mut redacted);
            redacted
        });
        report.push(path, errors, echoed);

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    output.report(&report)?;

    log_with_request_id!(
        info,
        total = report.total,
        failed = report.failed,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Validation finished"
    );

    if report.passed() {
        output.success(&format!("✓ {} document(s) valid", report.total))?;
        Ok(())
    } else {
        output.error(&format!("✗ {} of {} document(s) failed validation", report.failed, report.total))?;
        Err(Error::ValidationFailed {
            failed: report.failed,
            total: report.total,
        })
    }
}

/// The endpoint a document is validated for, resolved from arguments and configuration
#[derive(Debug)]
enum Endpoint {
    Resource {
        resource_type: String,
        id_policy: IdPolicy,
        relationships: RelationshipRules,
    },
    Relationship {
        field: Option<String>,
        types: Vec<String>,
        cardinality: Option<Cardinality>,
    },
}

impl Endpoint {
    fn from_args(args: &ValidateArgs, config: &Config) -> Result<Self> {
        match args.mode {
            ValidationMode::Create | ValidationMode::Update => Self::resource(args, config),
            ValidationMode::Relationship => Self::relationship(args, config),
        }
    }

    fn resource(args: &ValidateArgs, config: &Config) -> Result<Self> {
        if args.field.is_some() || !args.related_types.is_empty() || args.expect.is_some() {
            return Err(Error::invalid_args(
                "--field, --related-type and --expect only apply to relationship mode",
            ));
        }

        let resource_type = args
            .resource_type
            .clone()
            .ok_or_else(|| Error::invalid_args("--type is required to validate resource documents"))?;

        let id_policy = match (args.mode, &args.id) {
            (ValidationMode::Update, Some(id)) => IdPolicy::Required(id.clone()),
            (ValidationMode::Update, None) => {
                return Err(Error::invalid_args("--id is required in update mode"));
            }
            (_, Some(_)) => {
                return Err(Error::invalid_args("--id only applies to update mode"));
            }
            (_, None) if args.no_client_ids || !config.client_ids(&resource_type) => IdPolicy::Forbidden,
            (_, None) => IdPolicy::Optional,
        };

        let relationships = config.relationship_rules(&resource_type)?;
        debug!(%resource_type, ?id_policy, "Resolved resource endpoint");

        Ok(Self::Resource {
            resource_type,
            id_policy,
            relationships,
        })
    }

    /// Relationship endpoints take their rule from the configuration when
    /// both `--type` and `--field` are given; explicit flags override it.
    fn relationship(args: &ValidateArgs, config: &Config) -> Result<Self> {
        if args.id.is_some() || args.no_client_ids {
            return Err(Error::invalid_args(
                "--id and --no-client-ids only apply to resource documents",
            ));
        }

        let configured = match (&args.resource_type, &args.field) {
            (Some(resource_type), Some(field)) => config
                .resources
                .get(resource_type)
                .and_then(|resource| resource.relationships.get(field)),
            _ => None,
        };

        let types = if args.related_types.is_empty() {
            configured.map(|rule| rule.types.clone()).unwrap_or_default()
        } else {
            args.related_types.clone()
        };
        let cardinality = args
            .expect
            .map(Cardinality::from)
            .or_else(|| configured.and_then(|rule| rule.cardinality));

        debug!(field = ?args.field, ?types, ?cardinality, "Resolved relationship endpoint");

        Ok(Self::Relationship {
            field: args.field.clone(),
            types,
            cardinality,
        })
    }

    fn validate(&self, document: &Value, store: &dyn ResourceStore) -> Result<ValidationErrors> {
        let errors = match self {
            Self::Resource {
                resource_type,
                id_policy,
                relationships,
            } => {
                let context = ValidationContext::new(resource_type.as_str(), id_policy.clone(), store)?
                    .with_relationships(relationships.clone());
                ResourceValidator::new(document, context).errors().clone()
            }
            Self::Relationship {
                field,
                types,
                cardinality,
            } => {
                let mut validator = RelationshipDocumentValidator::new(document, store);
                if let Some(field) = field {
                    validator = validator.for_field(field.as_str());
                }
                if !types.is_empty() {
                    validator = validator.with_types(types.iter().cloned())?;
                }
                if let Some(cardinality) = cardinality {
                    validator = validator.expecting(*cardinality);
                }
                validator.errors().clone()
            }
        };

        Ok(errors)
    }
}

/// Read a request document from a JSON or YAML file
fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        error!("File not found: {}", path.display());
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("Reading document file");
    let content = fs::read_to_string(path)?;
    debug!("File read successfully, {} bytes", content.len());

    let format = FileFormat::of(path);
    let parsed = match format {
        FileFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        FileFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        FileFormat::Toml => {
            return Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON or YAML".to_string(),
            });
        }
    };

    parsed.map_err(|reason| {
        debug!(%reason, "Document could not be parsed");
        Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format.name().to_string(),
        }
    })
}
