// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,
        handlers::auth::delete_me,

        // --- Addresses ---
        handlers::addresses::list_addresses,
        handlers::addresses::create_address,
        handlers::addresses::get_address,
        handlers::addresses::update_address,
        handlers::addresses::partial_update_address,
        handlers::addresses::delete_address,

        // --- Vehicles ---
        handlers::vehicles::list_vehicles,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::get_vehicle,
        handlers::vehicles::update_vehicle,
        handlers::vehicles::partial_update_vehicle,
        handlers::vehicles::delete_vehicle,

        // --- Patients ---
        handlers::patients::list_patients,
        handlers::patients::create_patient,
        handlers::patients::get_patient,
        handlers::patients::update_patient,
        handlers::patients::partial_update_patient,
        handlers::patients::delete_patient,

        // --- Runs ---
        handlers::runs::list_runs,
        handlers::runs::create_run,
        handlers::runs::get_run,
        handlers::runs::update_run,
        handlers::runs::partial_update_run,
        handlers::runs::delete_run,

        // --- Master runs ---
        handlers::master_runs::list_master_runs,
        handlers::master_runs::create_master_run,
        handlers::master_runs::get_master_run,
        handlers::master_runs::update_master_run,
        handlers::master_runs::partial_update_master_run,
        handlers::master_runs::delete_master_run,

        // --- Recipes ---
        handlers::recipes::list_tags,
        handlers::recipes::create_tag,
        handlers::recipes::list_ingredients,
        handlers::recipes::create_ingredient,
        handlers::recipes::list_recipes,
        handlers::recipes::create_recipe,
        handlers::recipes::upload_image,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateMePayload,
            models::auth::AuthResponse,

            // --- Heroad ---
            models::address::Address,
            models::address::AddressPayload,
            models::vehicle::VehicleType,
            models::vehicle::Vehicle,
            models::vehicle::VehiclePayload,
            models::patient::Patient,
            models::patient::PatientPayload,
            models::run::Run,
            models::run::RunPayload,
            models::run::MasterRun,
            models::run::MasterRunDetail,
            models::run::MasterRunPayload,

            // --- Recipes ---
            models::recipe::Tag,
            models::recipe::Ingredient,
            models::recipe::Recipe,
            models::recipe::NamePayload,
            models::recipe::RecipePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Addresses", description = "Endereços de embarque e destino"),
        (name = "Vehicles", description = "Frota (VSL e ambulâncias)"),
        (name = "Patients", description = "Pacientes transportados"),
        (name = "Runs", description = "Corridas (trajetos de um paciente)"),
        (name = "Master runs", description = "Tournées: veículo, motoristas e corridas de um turno"),
        (name = "Recipes", description = "Receitas, tags e ingredientes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
