// src/services/cascade.rs
//
// Exclusão em cascata, em dois passos: `plan` calcula (sem tocar no armazenamento)
// tudo o que cai junto com a raiz e `execute` aplica. Todo DELETE da API passa
// por `delete_cascading`.

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        address::Address,
        patient::Patient,
        recipe::{Ingredient, Recipe, Tag},
        run::{MasterRun, Run},
        vehicle::Vehicle,
    },
};

/// O registro cuja exclusão foi pedida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Account(Uuid),
    Address(Uuid),
    Vehicle(Uuid),
    Patient(Uuid),
    MasterRun(Uuid),
    Run(Uuid),
    Tag(Uuid),
    Ingredient(Uuid),
    Recipe(Uuid),
}

/// Foto das tabelas alcançáveis a partir da raiz no momento da exclusão.
/// As demais ficam vazias.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub addresses: Vec<Address>,
    pub vehicles: Vec<Vehicle>,
    pub patients: Vec<Patient>,
    pub runs: Vec<Run>,
    pub master_runs: Vec<MasterRun>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
    pub recipes: Vec<Recipe>,
}

// Quais tabelas o `plan` consulta para cada raiz
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tables {
    addresses: bool,
    vehicles: bool,
    patients: bool,
    runs: bool,
    master_runs: bool,
    tags: bool,
    ingredients: bool,
    recipes: bool,
}

impl Tables {
    fn reachable_from(root: Root) -> Self {
        let none = Self::default();
        match root {
            Root::Account(_) => Self {
                addresses: true,
                vehicles: true,
                patients: true,
                runs: true,
                master_runs: true,
                tags: true,
                ingredients: true,
                recipes: true,
            },
            // Tournées entram para perder o paciente apagado
            Root::Address(_) => Self {
                addresses: true,
                patients: true,
                runs: true,
                master_runs: true,
                ..none
            },
            Root::Vehicle(_) => Self {
                vehicles: true,
                master_runs: true,
                runs: true,
                ..none
            },
            Root::Patient(_) => Self {
                patients: true,
                runs: true,
                master_runs: true,
                ..none
            },
            Root::MasterRun(_) => Self {
                master_runs: true,
                runs: true,
                ..none
            },
            Root::Run(_) => Self { runs: true, ..none },
            Root::Tag(_) => Self {
                tags: true,
                recipes: true,
                ..none
            },
            Root::Ingredient(_) => Self {
                ingredients: true,
                recipes: true,
                ..none
            },
            Root::Recipe(_) => Self {
                recipes: true,
                ..none
            },
        }
    }
}

impl Snapshot {
    /// Lê só as tabelas que a exclusão de `root` pode alcançar.
    pub async fn load_for(store: &Store, root: Root) -> Result<Self, AppError> {
        let tables = Tables::reachable_from(root);
        let mut snapshot = Self::default();

        if tables.addresses {
            snapshot.addresses = store.addresses.list().await?;
        }
        if tables.vehicles {
            snapshot.vehicles = store.vehicles.list().await?;
        }
        if tables.patients {
            snapshot.patients = store.patients.list().await?;
        }
        if tables.runs {
            snapshot.runs = store.runs.list().await?;
        }
        if tables.master_runs {
            snapshot.master_runs = store.master_runs.list().await?;
        }
        if tables.tags {
            snapshot.tags = store.tags.list().await?;
        }
        if tables.ingredients {
            snapshot.ingredients = store.ingredients.list().await?;
        }
        if tables.recipes {
            snapshot.recipes = store.recipes.list().await?;
        }

        Ok(snapshot)
    }

    fn contains(&self, root: Root) -> bool {
        match root {
            Root::Account(_) => true,
            Root::Address(id) => self.addresses.iter().any(|r| r.id == id),
            Root::Vehicle(id) => self.vehicles.iter().any(|r| r.id == id),
            Root::Patient(id) => self.patients.iter().any(|r| r.id == id),
            Root::MasterRun(id) => self.master_runs.iter().any(|r| r.id == id),
            Root::Run(id) => self.runs.iter().any(|r| r.id == id),
            Root::Tag(id) => self.tags.iter().any(|r| r.id == id),
            Root::Ingredient(id) => self.ingredients.iter().any(|r| r.id == id),
            Root::Recipe(id) => self.recipes.iter().any(|r| r.id == id),
        }
    }
}

/// O resultado do `plan`: ids a apagar e os registros sobreviventes cujos
/// conjuntos M2M precisam ser regravados.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CascadePlan {
    pub account: Option<Uuid>,
    pub runs: Vec<Uuid>,
    pub master_runs: Vec<Uuid>,
    pub patients: Vec<Uuid>,
    pub addresses: Vec<Uuid>,
    pub vehicles: Vec<Uuid>,
    pub recipes: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
    pub master_run_updates: Vec<MasterRun>,
    pub recipe_updates: Vec<Recipe>,
}

impl CascadePlan {
    pub fn deleted_count(&self) -> usize {
        usize::from(self.account.is_some())
            + self.runs.len()
            + self.master_runs.len()
            + self.patients.len()
            + self.addresses.len()
            + self.vehicles.len()
            + self.recipes.len()
            + self.tags.len()
            + self.ingredients.len()
    }
}

// Conjunto com ordem de inserção estável (o plano sai determinístico)
#[derive(Default)]
struct IdSet {
    order: Vec<Uuid>,
    seen: HashSet<Uuid>,
}

impl IdSet {
    fn insert(&mut self, id: Uuid) {
        if self.seen.insert(id) {
            self.order.push(id);
        }
    }

    fn contains(&self, id: &Uuid) -> bool {
        self.seen.contains(id)
    }

    fn extend(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        for id in ids {
            self.insert(id);
        }
    }
}

/// Calcula o fechamento da exclusão a partir da raiz.
pub fn plan(root: Root, snapshot: &Snapshot) -> CascadePlan {
    let mut account = None;
    let mut runs = IdSet::default();
    let mut master_runs = IdSet::default();
    let mut patients = IdSet::default();
    let mut addresses = IdSet::default();
    let mut vehicles = IdSet::default();
    let mut recipes = IdSet::default();
    let mut tags = IdSet::default();
    let mut ingredients = IdSet::default();

    match root {
        Root::Account(user_id) => {
            account = Some(user_id);
            let owned = |owner: Uuid| owner == user_id;
            runs.extend(snapshot.runs.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            master_runs.extend(snapshot.master_runs.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            patients.extend(snapshot.patients.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            addresses.extend(snapshot.addresses.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            vehicles.extend(snapshot.vehicles.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            recipes.extend(snapshot.recipes.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            tags.extend(snapshot.tags.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
            ingredients.extend(snapshot.ingredients.iter().filter(|r| owned(r.owner_id)).map(|r| r.id));
        }
        Root::Address(id) => addresses.insert(id),
        Root::Vehicle(id) => vehicles.insert(id),
        Root::Patient(id) => patients.insert(id),
        Root::MasterRun(id) => master_runs.insert(id),
        Root::Run(id) => runs.insert(id),
        Root::Tag(id) => tags.insert(id),
        Root::Ingredient(id) => ingredients.insert(id),
        Root::Recipe(id) => recipes.insert(id),
    }

    // Endereço -> pacientes que moram nele
    patients.extend(
        snapshot
            .patients
            .iter()
            .filter(|p| addresses.contains(&p.address_id))
            .map(|p| p.id),
    );

    // Veículo -> tournées que o usam
    master_runs.extend(
        snapshot
            .master_runs
            .iter()
            .filter(|m| vehicles.contains(&m.vehicle_id))
            .map(|m| m.id),
    );

    // Endereço, paciente ou tournée -> corridas
    runs.extend(
        snapshot
            .runs
            .iter()
            .filter(|r| {
                addresses.contains(&r.pick_up_location_id)
                    || addresses.contains(&r.deposit_location_id)
                    || patients.contains(&r.patient_id)
                    || master_runs.contains(&r.master_run_id)
            })
            .map(|r| r.id),
    );

    let master_run_updates = snapshot
        .master_runs
        .iter()
        .filter(|m| !master_runs.contains(&m.id))
        .filter_map(|m| {
            let drivers: Vec<Uuid> = m
                .drivers
                .iter()
                .copied()
                .filter(|d| Some(*d) != account)
                .collect();
            let kept_patients: Vec<Uuid> = m
                .patients
                .iter()
                .copied()
                .filter(|p| !patients.contains(p))
                .collect();
            (drivers.len() != m.drivers.len() || kept_patients.len() != m.patients.len()).then(|| {
                MasterRun {
                    drivers,
                    patients: kept_patients,
                    ..m.clone()
                }
            })
        })
        .collect();

    let recipe_updates = snapshot
        .recipes
        .iter()
        .filter(|r| !recipes.contains(&r.id))
        .filter_map(|r| {
            let kept_tags: Vec<Uuid> = r.tags.iter().copied().filter(|t| !tags.contains(t)).collect();
            let kept_ingredients: Vec<Uuid> = r
                .ingredients
                .iter()
                .copied()
                .filter(|i| !ingredients.contains(i))
                .collect();
            (kept_tags.len() != r.tags.len() || kept_ingredients.len() != r.ingredients.len())
                .then(|| Recipe {
                    tags: kept_tags,
                    ingredients: kept_ingredients,
                    ..r.clone()
                })
        })
        .collect();

    CascadePlan {
        account,
        runs: runs.order,
        master_runs: master_runs.order,
        patients: patients.order,
        addresses: addresses.order,
        vehicles: vehicles.order,
        recipes: recipes.order,
        tags: tags.order,
        ingredients: ingredients.order,
        master_run_updates,
        recipe_updates,
    }
}

/// Um `DELETE ... WHERE id = ANY($1)` por tabela, filhos antes dos pais e a
/// conta por último. Tabelas sem nada a apagar ficam de fora.
pub fn delete_statements(plan: &CascadePlan) -> Vec<(&'static str, &[Uuid])> {
    [
        ("DELETE FROM runs WHERE id = ANY($1)", plan.runs.as_slice()),
        ("DELETE FROM master_runs WHERE id = ANY($1)", plan.master_runs.as_slice()),
        ("DELETE FROM patients WHERE id = ANY($1)", plan.patients.as_slice()),
        ("DELETE FROM addresses WHERE id = ANY($1)", plan.addresses.as_slice()),
        ("DELETE FROM vehicles WHERE id = ANY($1)", plan.vehicles.as_slice()),
        ("DELETE FROM recipes WHERE id = ANY($1)", plan.recipes.as_slice()),
        ("DELETE FROM tags WHERE id = ANY($1)", plan.tags.as_slice()),
        ("DELETE FROM ingredients WHERE id = ANY($1)", plan.ingredients.as_slice()),
        ("DELETE FROM users WHERE id = ANY($1)", plan.account.as_slice()),
    ]
    .into_iter()
    .filter(|(_, ids)| !ids.is_empty())
    .collect()
}

/// Aplica o plano. No Postgres tudo roda numa transação só; na memória,
/// filhos primeiro, depois os conjuntos M2M, por fim a conta.
pub async fn execute(store: &Store, plan: &CascadePlan) -> Result<(), AppError> {
    match &store.pool {
        Some(pool) => execute_in_transaction(pool, plan).await,
        None => execute_in_memory(store, plan).await,
    }
}

// As tabelas de ligação (motoristas, pacientes, tags, ingredientes) perdem as
// linhas pelo ON DELETE CASCADE dentro da mesma transação, o que equivale aos
// `master_run_updates` e `recipe_updates` do plano.
async fn execute_in_transaction(pool: &PgPool, plan: &CascadePlan) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    for (sql, ids) in delete_statements(plan) {
        sqlx::query(sql).bind(ids).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn execute_in_memory(store: &Store, plan: &CascadePlan) -> Result<(), AppError> {
    store.runs.delete_many(&plan.runs).await?;
    store.master_runs.delete_many(&plan.master_runs).await?;
    store.patients.delete_many(&plan.patients).await?;
    store.addresses.delete_many(&plan.addresses).await?;
    store.vehicles.delete_many(&plan.vehicles).await?;
    store.recipes.delete_many(&plan.recipes).await?;
    store.tags.delete_many(&plan.tags).await?;
    store.ingredients.delete_many(&plan.ingredients).await?;

    for master_run in &plan.master_run_updates {
        store.master_runs.update(master_run).await?;
    }
    for recipe in &plan.recipe_updates {
        store.recipes.update(recipe).await?;
    }

    if let Some(user_id) = plan.account {
        store.users.delete_user(user_id).await?;
    }

    Ok(())
}

/// Planeja e executa. `false` se a raiz não existe.
pub async fn delete_cascading(store: &Store, root: Root) -> Result<bool, AppError> {
    if let Root::Account(user_id) = root {
        if store.users.find_by_id(user_id).await?.is_none() {
            return Ok(false);
        }
    }

    let snapshot = Snapshot::load_for(store, root).await?;
    if !snapshot.contains(root) {
        return Ok(false);
    }

    let plan = plan(root, &snapshot);
    tracing::info!(
        "🗑️ Exclusão em cascata a partir de {:?}: {} registro(s), {} tournée(s) e {} receita(s) regravadas",
        root,
        plan.deleted_count(),
        plan.master_run_updates.len(),
        plan.recipe_updates.len()
    );

    execute(store, &plan).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{auth::User, vehicle::VehicleType};

    struct World {
        owner: Uuid,
        other: Uuid,
        address: Address,
        vehicle: Vehicle,
        patient: Patient,
        master_run: MasterRun,
        run: Run,
        // Tournée de outra conta, com o dono de `owner` como motorista
        foreign_master_run: MasterRun,
    }

    fn world() -> (World, Snapshot) {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let now = Utc::now();

        let address = Address {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: "Domicile".into(),
            address1: "1 rue de la fontaine".into(),
            address2: String::new(),
            zip_code: 33000,
            city: "Bordeaux".into(),
            created_at: now,
        };
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            owner_id: owner,
            kind: VehicleType::Vsl,
            license_plate: "AA-123-AA".into(),
            created_at: now,
        };
        let patient = Patient {
            id: Uuid::new_v4(),
            owner_id: owner,
            firstname: "Thierry".into(),
            lastname: "Henry".into(),
            phone_number: "0798765678".into(),
            special: false,
            description: String::new(),
            address_id: address.id,
            created_at: now,
        };
        let master_run = MasterRun {
            id: Uuid::new_v4(),
            owner_id: owner,
            comments: String::new(),
            date: now,
            am: true,
            pm: false,
            vehicle_id: vehicle.id,
            drivers: vec![owner],
            patients: vec![patient.id],
            created_at: now,
        };
        let run = Run {
            id: Uuid::new_v4(),
            owner_id: owner,
            date: now,
            departure_time: now,
            arriving_time: now,
            pick_up_location_id: address.id,
            deposit_location_id: address.id,
            is_return_path: false,
            comments: String::new(),
            master_run_id: master_run.id,
            patient_id: patient.id,
            created_at: now,
        };
        let other_vehicle = Vehicle {
            id: Uuid::new_v4(),
            owner_id: other,
            ..vehicle.clone()
        };
        let foreign_master_run = MasterRun {
            id: Uuid::new_v4(),
            owner_id: other,
            vehicle_id: other_vehicle.id,
            drivers: vec![other, owner],
            patients: vec![patient.id],
            ..master_run.clone()
        };

        let snapshot = Snapshot {
            addresses: vec![address.clone()],
            vehicles: vec![vehicle.clone(), other_vehicle],
            patients: vec![patient.clone()],
            runs: vec![run.clone()],
            master_runs: vec![master_run.clone(), foreign_master_run.clone()],
            ..Default::default()
        };

        (
            World {
                owner,
                other,
                address,
                vehicle,
                patient,
                master_run,
                run,
                foreign_master_run,
            },
            snapshot,
        )
    }

    #[test]
    fn address_takes_its_patients_and_their_runs() {
        let (w, snapshot) = world();
        let plan = plan(Root::Address(w.address.id), &snapshot);

        assert_eq!(plan.addresses, vec![w.address.id]);
        assert_eq!(plan.patients, vec![w.patient.id]);
        assert_eq!(plan.runs, vec![w.run.id]);
        assert!(plan.master_runs.is_empty());

        // O paciente sai das tournées que sobrevivem
        assert_eq!(plan.master_run_updates.len(), 2);
        assert!(plan.master_run_updates.iter().all(|m| m.patients.is_empty()));
    }

    #[test]
    fn vehicle_takes_master_runs_and_their_runs() {
        let (w, snapshot) = world();
        let plan = plan(Root::Vehicle(w.vehicle.id), &snapshot);

        assert_eq!(plan.master_runs, vec![w.master_run.id]);
        assert_eq!(plan.runs, vec![w.run.id]);
        assert!(plan.patients.is_empty());
        assert!(plan.master_run_updates.is_empty());
    }

    #[test]
    fn account_takes_everything_it_owns_and_leaves_foreign_master_runs() {
        let (w, snapshot) = world();
        let plan = plan(Root::Account(w.owner), &snapshot);

        assert_eq!(plan.account, Some(w.owner));
        assert_eq!(plan.master_runs, vec![w.master_run.id]);
        assert_eq!(plan.vehicles, vec![w.vehicle.id]);
        assert_eq!(plan.deleted_count(), 6);

        let [updated] = plan.master_run_updates.as_slice() else {
            panic!("expected exactly one surviving master run");
        };
        assert_eq!(updated.id, w.foreign_master_run.id);
        assert_eq!(updated.drivers, vec![w.other]);
        assert!(updated.patients.is_empty());
    }

    #[test]
    fn tag_is_detached_from_surviving_recipes() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: "Vegan".into(),
            created_at: now,
        };
        let kept = Uuid::new_v4();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: "Curry".into(),
            time_minutes: 30,
            price: Decimal::new(550, 2),
            link: String::new(),
            tags: vec![tag.id, kept],
            ingredients: vec![],
            image: None,
            created_at: now,
        };
        let snapshot = Snapshot {
            tags: vec![tag.clone()],
            recipes: vec![recipe.clone()],
            ..Default::default()
        };

        let plan = plan(Root::Tag(tag.id), &snapshot);
        assert_eq!(plan.tags, vec![tag.id]);
        assert!(plan.recipes.is_empty());
        assert_eq!(plan.recipe_updates[0].tags, vec![kept]);
    }

    #[tokio::test]
    async fn execute_removes_the_closure_from_the_store() {
        let (w, snapshot) = world();
        let store = seeded(&snapshot).await;

        for user_id in [w.owner, w.other] {
            store
                .users
                .create_user(&User {
                    id: user_id,
                    email: format!("{}@heroad.fr", user_id),
                    name: String::new(),
                    is_active: true,
                    is_staff: false,
                    is_superuser: false,
                    password_hash: "x".into(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert!(delete_cascading(&store, Root::Account(w.owner)).await.unwrap());

        assert!(store.users.find_by_id(w.owner).await.unwrap().is_none());
        assert!(store.addresses.list().await.unwrap().is_empty());
        assert!(store.patients.list().await.unwrap().is_empty());
        assert!(store.runs.list().await.unwrap().is_empty());

        let survivors = store.master_runs.list().await.unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].drivers, vec![w.other]);

        // Segunda vez: a raiz não existe mais
        assert!(!delete_cascading(&store, Root::Account(w.owner)).await.unwrap());
        assert!(!delete_cascading(&store, Root::Run(w.run.id)).await.unwrap());
    }

    fn table(sql: &str) -> &str {
        sql.split_whitespace().nth(2).unwrap_or_default()
    }

    #[test]
    fn statements_delete_children_first_and_the_account_last() {
        let (w, snapshot) = world();
        let plan = plan(Root::Account(w.owner), &snapshot);

        let statements = delete_statements(&plan);
        let tables: Vec<&str> = statements.iter().map(|(sql, _)| table(sql)).collect();
        assert_eq!(
            tables,
            vec!["runs", "master_runs", "patients", "addresses", "vehicles", "users"]
        );
        assert_eq!(statements.last().map(|(_, ids)| ids.to_vec()), Some(vec![w.owner]));
    }

    #[test]
    fn statements_skip_tables_with_nothing_to_delete() {
        let (w, snapshot) = world();
        let plan = plan(Root::Run(w.run.id), &snapshot);

        let statements = delete_statements(&plan);
        assert_eq!(statements.len(), 1);
        assert_eq!(table(statements[0].0), "runs");
        assert_eq!(statements[0].1, [w.run.id]);
    }

    async fn seeded(snapshot: &Snapshot) -> Store {
        let store = Store::in_memory();
        for a in &snapshot.addresses {
            store.addresses.insert(a).await.unwrap();
        }
        for v in &snapshot.vehicles {
            store.vehicles.insert(v).await.unwrap();
        }
        for p in &snapshot.patients {
            store.patients.insert(p).await.unwrap();
        }
        for m in &snapshot.master_runs {
            store.master_runs.insert(m).await.unwrap();
        }
        for r in &snapshot.runs {
            store.runs.insert(r).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn snapshot_reads_only_the_reachable_tables() {
        let (w, snapshot) = world();
        let store = seeded(&snapshot).await;

        let for_run = Snapshot::load_for(&store, Root::Run(w.run.id)).await.unwrap();
        assert_eq!(for_run.runs.len(), 1);
        assert!(for_run.addresses.is_empty());
        assert!(for_run.master_runs.is_empty());
        assert!(for_run.patients.is_empty());

        let for_vehicle = Snapshot::load_for(&store, Root::Vehicle(w.vehicle.id)).await.unwrap();
        assert_eq!(for_vehicle.vehicles.len(), 2);
        assert_eq!(for_vehicle.master_runs.len(), 2);
        assert!(for_vehicle.addresses.is_empty());
        assert!(for_vehicle.patients.is_empty());

        // O plano a partir da foto parcial é o mesmo da foto completa
        let full = plan(Root::Address(w.address.id), &snapshot);
        let partial = Snapshot::load_for(&store, Root::Address(w.address.id)).await.unwrap();
        assert!(partial.vehicles.is_empty());
        assert_eq!(plan(Root::Address(w.address.id), &partial), full);
    }

    #[tokio::test]
    async fn account_deletion_reaches_the_recipe_book() {
        let store = Store::in_memory();
        let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        for user_id in [owner, other] {
            store
                .users
                .create_user(&User {
                    id: user_id,
                    email: format!("{}@heroad.fr", user_id),
                    name: String::new(),
                    is_active: true,
                    is_staff: false,
                    is_superuser: false,
                    password_hash: "x".into(),
                    created_at: now,
                })
                .await
                .unwrap();
        }

        let tag = |owner_id: Uuid, name: &str| Tag {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            created_at: now,
        };
        let vegan = store.tags.insert(&tag(owner, "Vegan")).await.unwrap();
        let dessert = store.tags.insert(&tag(other, "Dessert")).await.unwrap();
        let salt = store
            .ingredients
            .insert(&Ingredient {
                id: Uuid::new_v4(),
                owner_id: owner,
                name: "Salt".into(),
                created_at: now,
            })
            .await
            .unwrap();
        let recipe = |owner_id: Uuid, tags: Vec<Uuid>, ingredients: Vec<Uuid>| Recipe {
            id: Uuid::new_v4(),
            owner_id,
            title: "Curry".into(),
            time_minutes: 30,
            price: Decimal::new(550, 2),
            link: String::new(),
            tags,
            ingredients,
            image: None,
            created_at: now,
        };
        store.recipes.insert(&recipe(owner, vec![vegan.id], vec![salt.id])).await.unwrap();
        let kept = store
            .recipes
            .insert(&recipe(other, vec![vegan.id, dessert.id], vec![salt.id]))
            .await
            .unwrap();

        assert!(delete_cascading(&store, Root::Account(owner)).await.unwrap());

        let tags = store.tags.list().await.unwrap();
        assert_eq!(tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![dessert.id]);
        assert!(store.ingredients.list().await.unwrap().is_empty());

        let [survivor]: [Recipe; 1] = store.recipes.list().await.unwrap().try_into().unwrap();
        assert_eq!(survivor.id, kept.id);
        assert_eq!(survivor.tags, vec![dessert.id]);
        assert!(survivor.ingredients.is_empty());
    }
}
