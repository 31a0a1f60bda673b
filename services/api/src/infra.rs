use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use propeval::auth::{AuthContext, StaticTokenAuthenticator};
use propeval::error::AppError;
use propeval::evaluation::hierarchy::{
    HierarchyService, HierarchyStore, InMemoryHierarchyStore, LocalizedText, PropertyType,
};
use propeval::evaluation::import::{BulkImportService, ImportLimits};
use propeval::evaluation::sessions::{EvaluationSessionService, InMemorySessionStore};
use propeval::evaluation::sheet::TemplateKind;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Bearer tokens resolved by the bundled demo authenticator. Real
/// deployments swap in an identity-provider backed authenticator.
pub(crate) const DEMO_ADMIN_TOKEN: &str = "demo-admin-token";
pub(crate) const DEMO_USER_TOKEN: &str = "demo-user-token";
pub(crate) const DEMO_USER_ID: u64 = 2;

/// Fully wired service set backed by the in-memory stores, shared by the
/// HTTP server and the CLI commands.
pub(crate) struct Platform {
    pub(crate) hierarchy: Arc<HierarchyService<InMemoryHierarchyStore>>,
    pub(crate) import: Arc<BulkImportService<InMemoryHierarchyStore>>,
    pub(crate) sessions:
        Arc<EvaluationSessionService<InMemorySessionStore, InMemoryHierarchyStore>>,
    pub(crate) auth: Arc<StaticTokenAuthenticator>,
    pub(crate) demo_property_type: PropertyType,
}

impl Platform {
    pub(crate) fn seeded(limits: ImportLimits) -> Result<Self, AppError> {
        let hierarchy_store = Arc::new(InMemoryHierarchyStore::default());
        let session_store = Arc::new(InMemorySessionStore::default());
        let demo_property_type = seed_demo_hierarchy(hierarchy_store.as_ref())?;

        Ok(Self {
            hierarchy: Arc::new(HierarchyService::new(Arc::clone(&hierarchy_store))),
            import: Arc::new(BulkImportService::new(Arc::clone(&hierarchy_store), limits)),
            sessions: Arc::new(EvaluationSessionService::new(
                session_store,
                hierarchy_store,
            )),
            auth: demo_authenticator(),
            demo_property_type,
        })
    }
}

pub(crate) fn demo_authenticator() -> Arc<StaticTokenAuthenticator> {
    Arc::new(
        StaticTokenAuthenticator::default()
            .with_token(
                DEMO_ADMIN_TOKEN,
                AuthContext {
                    user_id: 1,
                    superuser: true,
                },
            )
            .with_token(
                DEMO_USER_TOKEN,
                AuthContext {
                    user_id: DEMO_USER_ID,
                    superuser: false,
                },
            ),
    )
}

/// Seed small bilingual questionnaires for an apartment and a house
/// property type. Returns the apartment type, which the demo endpoints
/// and the CLI walkthrough drive.
pub(crate) fn seed_demo_hierarchy(
    store: &InMemoryHierarchyStore,
) -> Result<PropertyType, AppError> {
    let property_type =
        store.insert_property_type(LocalizedText::new("Apartament", "Apartment"))?;

    let structure = store.insert_category(
        property_type.id,
        LocalizedText::new("Structura cladirii", "Building structure"),
    )?;
    let roof = store.insert_question(
        structure.id,
        LocalizedText::new("Care este starea acoperisului?", "What is the roof condition?"),
        5,
    )?;
    store.insert_answer(roof.id, LocalizedText::new("Foarte buna", "Very good"), 10)?;
    store.insert_answer(roof.id, LocalizedText::new("Buna", "Good"), 7)?;
    store.insert_answer(
        roof.id,
        LocalizedText::new("Necesita reparatii", "Needs repairs"),
        3,
    )?;
    let walls = store.insert_question(
        structure.id,
        LocalizedText::new(
            "Exista fisuri vizibile in pereti?",
            "Are there visible cracks in the walls?",
        ),
        8,
    )?;
    store.insert_answer(walls.id, LocalizedText::new("Nu", "No"), 10)?;
    store.insert_answer(
        walls.id,
        LocalizedText::new("Fisuri superficiale", "Surface cracks"),
        5,
    )?;
    store.insert_answer(
        walls.id,
        LocalizedText::new("Fisuri structurale", "Structural cracks"),
        1,
    )?;

    let utilities =
        store.insert_category(property_type.id, LocalizedText::new("Instalatii", "Utilities"))?;
    let electrics = store.insert_question(
        utilities.id,
        LocalizedText::new(
            "Cand a fost refacuta instalatia electrica?",
            "When was the electrical system redone?",
        ),
        6,
    )?;
    store.insert_answer(
        electrics.id,
        LocalizedText::new("In ultimii 5 ani", "Within the last 5 years"),
        10,
    )?;
    store.insert_answer(
        electrics.id,
        LocalizedText::new("Acum 5-15 ani", "5 to 15 years ago"),
        6,
    )?;
    store.insert_answer(
        electrics.id,
        LocalizedText::new("Peste 15 ani", "More than 15 years ago"),
        2,
    )?;

    let house = store.insert_property_type(LocalizedText::new("Casa", "House"))?;
    let exterior = store.insert_category(
        house.id,
        LocalizedText::new("Exterior si teren", "Exterior and grounds"),
    )?;
    let fence = store.insert_question(
        exterior.id,
        LocalizedText::new("In ce stare este imprejmuirea?", "What condition is the fence in?"),
        4,
    )?;
    store.insert_answer(fence.id, LocalizedText::new("Foarte buna", "Very good"), 10)?;
    store.insert_answer(fence.id, LocalizedText::new("Degradata", "Deteriorated"), 3)?;
    let drainage = store.insert_question(
        exterior.id,
        LocalizedText::new(
            "Exista probleme de drenaj pe teren?",
            "Are there drainage problems on the lot?",
        ),
        7,
    )?;
    store.insert_answer(drainage.id, LocalizedText::new("Nu", "No"), 10)?;
    store.insert_answer(
        drainage.id,
        LocalizedText::new("Balteste apa dupa ploi", "Water pools after rain"),
        2,
    )?;

    Ok(property_type)
}

pub(crate) fn parse_sheet_kind(raw: &str) -> Result<TemplateKind, String> {
    TemplateKind::parse(raw).ok_or_else(|| format!("expected 'template' or 'export', got '{raw}'"))
}
