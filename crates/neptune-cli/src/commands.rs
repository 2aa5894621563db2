use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use chrono::{Datelike, Utc};
use neptune_catalog::{
    CascadeField, CatalogApi, DashboardApi, EntryForm, FormError, OwnerSelection, PurchaseType,
    RebateTargets, RowId, SavingsMetric, SelectionRow, format_currency, marketshare_rows,
    summarize_savings,
};
use neptune_client::NeptuneClient;
use neptune_session::{Access, Credential, FileStore, SessionController, SessionStore, gate};

use neptune_cli::output::{
    bulk_inventory_table, marketshare_table, print_options, row_table, savings_table,
};
use neptune_cli::settings::{Settings, settings_path};

use crate::cli::{ClientArgs, ConfigArgs, DashboardArgs, EntryArgs, LoginArgs, RebateArgs};

/// Settings plus command-line overrides.
pub struct Context {
    pub settings: Settings,
    pub settings_file: Option<PathBuf>,
}

impl Context {
    pub fn load(config: Option<&Path>, base_url: Option<String>) -> Self {
        let settings_file = config.map(Path::to_path_buf).or_else(settings_path);
        let mut settings = settings_file
            .as_deref()
            .map(Settings::load_from)
            .unwrap_or_default();
        if let Some(base_url) = base_url {
            settings.api.base_url = base_url;
        }
        Self {
            settings,
            settings_file,
        }
    }

    fn client(&self, token: Option<String>) -> Result<NeptuneClient> {
        Ok(NeptuneClient::new(&self.settings.api)?.with_token(token))
    }

    fn controller(&self) -> Result<SessionController<NeptuneClient, FileStore>> {
        Ok(SessionController::new(self.client(None)?, self.session_storage()))
    }

    fn session_storage(&self) -> FileStore {
        FileStore::new(self.settings.session_dir())
    }

    /// The persisted session, which must be authenticated.
    fn authenticated(&self) -> Result<(SessionStore<FileStore>, String)> {
        let store = SessionStore::rehydrate(self.session_storage());
        match (gate(store.credential()), store.credential().token.clone()) {
            (Access::Granted, Some(token)) => Ok((store, token)),
            _ => bail!("not logged in; run `neptune login` first"),
        }
    }
}

/// Pick the client: explicit flag, then settings, then the admin's own client.
pub fn resolve_client_id(
    explicit: Option<i64>,
    settings: &Settings,
    credential: &Credential,
) -> Option<i64> {
    explicit.or(settings.default_client_id).or_else(|| {
        credential
            .identity
            .as_ref()
            .and_then(|identity| identity.admin_client_id())
    })
}

fn client_id(ctx: &Context, args: &ClientArgs, credential: &Credential) -> Result<i64> {
    resolve_client_id(args.client, &ctx.settings, credential).context(
        "no client given; pass --client or set a default with `neptune config --set-client`",
    )
}

pub async fn run_login(ctx: &Context, args: &LoginArgs) -> Result<()> {
    let mut controller = ctx.controller()?;
    let credential = controller.login(&args.email, &args.password).await;
    if let Some(error) = &credential.last_error {
        bail!("login failed: {error}");
    }

    let email = credential
        .identity
        .as_ref()
        .and_then(|identity| identity.email())
        .unwrap_or(&args.email);
    println!("Logged in as {email}");
    Ok(())
}

pub async fn run_logout(ctx: &Context) -> Result<()> {
    let mut controller = ctx.controller()?;
    controller.logout().await;
    println!("Logged out");
    Ok(())
}

pub fn run_status(ctx: &Context) -> Result<()> {
    let store = SessionStore::rehydrate(ctx.session_storage());
    let credential = store.credential();

    println!("Server: {}", ctx.settings.api.base_url);
    println!("Session: {}", store.phase());
    if let Some(identity) = &credential.identity {
        if let Some(email) = identity.email() {
            println!("User: {email}");
        }
        if let Some(client) = identity.admin_client_id() {
            println!("Client: {client}");
        }
    }
    Ok(())
}

fn row_of(form: &EntryForm, row: RowId) -> Result<&SelectionRow> {
    Ok(form.row(row).ok_or(FormError::UnknownRow(row))?)
}

pub async fn run_entry(ctx: &Context, args: &EntryArgs) -> Result<()> {
    let (store, token) = ctx.authenticated()?;
    let client_id = client_id(ctx, &args.client, store.credential())?;
    let api = ctx.client(Some(token))?;

    let mut form = EntryForm::load(&api, client_id).await;
    if form.index().is_empty() {
        bail!("client {client_id} has no devices in the catalog");
    }
    let row = form.add_row();

    let chosen = [
        (CascadeField::Specialty, args.specialty.as_deref()),
        (CascadeField::Category, args.category.as_deref()),
        (CascadeField::Manufacturer, args.manufacturer.as_deref()),
        (CascadeField::Device, args.device.as_deref()),
    ];
    for (field, value) in chosen {
        let select = row_of(&form, row)?.field(field);
        let Some(value) = value else {
            print_options(&format!("Available {field} options"), select.options());
            return Ok(());
        };
        if !select.offers(value) {
            print_options(&format!("Available {field} options"), select.options());
            bail!("{value:?} is not an available {field}");
        }
        if let Some(ticket) = form.select(row, field, Some(value.to_string()))? {
            form.run_lookup(&api, ticket).await;
        }
    }

    let purchase_type = PurchaseType::from(args.purchase_type);
    if let Some(ticket) = form.set_purchase_type(row, purchase_type)? {
        form.run_lookup(&api, ticket).await;
    }

    match &args.identifier {
        Some(identifier) => {
            if purchase_type == PurchaseType::Bulk
                && !row_of(&form, row)?.identifier.offers(identifier)
            {
                print_options("Available identifiers", row_of(&form, row)?.identifier.options());
                bail!("{identifier:?} is not in stock for this device");
            }
            form.set_identifier(row, Some(identifier.clone()))?;
        }
        None if purchase_type == PurchaseType::Bulk => {
            print_options("Available identifiers", row_of(&form, row)?.identifier.options());
        }
        None => println!("Consignment row: pass --identifier to record the lot or serial"),
    }

    if let Some(cost_type) = args.cost_type {
        form.set_cost_type(row, cost_type.into())?;
    }
    if !args.discounts.is_empty() {
        form.set_discounts(row, &args.discounts)?;
    }

    for event in form.drain_events() {
        tracing::debug!(row = %event.row, field = ?event.field, "Field changed");
    }

    let selection = row_of(&form, row)?;
    println!("{}", row_table(selection));
    print_options("Available discounts", selection.discounts.options());
    Ok(())
}

pub async fn run_accounts(ctx: &Context, args: &ClientArgs) -> Result<()> {
    let (store, token) = ctx.authenticated()?;
    let client_id = client_id(ctx, args, store.credential())?;
    let api = ctx.client(Some(token))?;

    let accounts = api.accounts_for_client(client_id).await?;
    let mut selection = OwnerSelection::default();
    selection.update(Some(client_id), &accounts);

    print_options("Owners", selection.owners.options());
    print_options("Physicians", selection.physician.options());
    Ok(())
}

pub async fn run_rebate_targets(ctx: &Context, args: &RebateArgs) -> Result<()> {
    let (_, token) = ctx.authenticated()?;
    let api = ctx.client(Some(token))?;

    let mut picker = RebateTargets::default();
    if let Some(kind) = picker.set_kind(Some(args.kind.into())) {
        let entries = api.rebatable_entries(args.manufacturer, kind).await?;
        picker.apply(kind, &entries);
    }
    print_options("Rebate targets", picker.targets.options());
    Ok(())
}

pub async fn run_dashboard(ctx: &Context, args: &DashboardArgs) -> Result<()> {
    let (store, token) = ctx.authenticated()?;
    let client_id = client_id(ctx, &args.client, store.credential())?;
    let api = ctx.client(Some(token))?;
    let metric = SavingsMetric::from(args.metric);

    let marketshare = api.marketshare(client_id).await?;
    println!("Marketshare, {}:", marketshare.name);
    println!("{}", marketshare_table(&marketshare_rows(&marketshare.marketshare)));

    let months = api.savings(client_id, args.year).await?;
    let now = Utc::now();
    let current_month = match args.year {
        Some(year) if year != now.year() => 0,
        _ => now.month(),
    };
    let summary = summarize_savings(&months, metric, current_month);
    println!("Net {metric}:");
    if current_month > 0 {
        println!("  This month: {}", format_currency(summary.current_month));
    }
    println!("  Year to date: {}", format_currency(summary.year_to_date));
    println!("{}", savings_table(&summary));

    let inventory = api.bulk_inventory(client_id).await?;
    println!("{}", bulk_inventory_table(&inventory));
    Ok(())
}

pub fn run_config(ctx: &Context, args: &ConfigArgs) -> Result<()> {
    let mut settings = ctx.settings.clone();
    let mut changed = false;
    if let Some(base_url) = &args.set_base_url {
        settings.api.base_url.clone_from(base_url);
        changed = true;
    }
    if let Some(client) = args.set_client {
        settings.default_client_id = Some(client);
        changed = true;
    }
    if let Some(timeout) = args.set_timeout {
        settings.api.timeout_secs = timeout;
        changed = true;
    }

    if changed {
        let path = ctx
            .settings_file
            .as_deref()
            .context("could not determine settings path; pass --config")?;
        settings.save_to(path)?;
        println!("Saved {}", path.display());
    }
    print!("{}", toml::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neptune_session::UserIdentity;

    fn admin_of(client: i64) -> Credential {
        Credential {
            identity: UserIdentity::from_json(
                serde_json::json!({"id": 1, "admin_client": {"id": client}}),
            ),
            token: Some("t".to_string()),
            ..Credential::default()
        }
    }

    #[test]
    fn test_explicit_client_wins() {
        let settings = Settings {
            default_client_id: Some(7),
            ..Settings::default()
        };
        assert_eq!(resolve_client_id(Some(3), &settings, &admin_of(5)), Some(3));
        assert_eq!(resolve_client_id(None, &settings, &admin_of(5)), Some(7));
    }

    #[test]
    fn test_admin_client_fallback() {
        assert_eq!(resolve_client_id(None, &Settings::default(), &admin_of(5)), Some(5));
        assert_eq!(
            resolve_client_id(None, &Settings::default(), &Credential::anonymous()),
            None
        );
    }

    #[test]
    fn test_context_override_and_unauthenticated_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.toml");
        std::fs::write(
            &config,
            format!("storage_dir = {:?}\n", dir.path().join("session").display().to_string()),
        )
        .unwrap();

        let ctx = Context::load(Some(&config), Some("https://override.example".to_string()));

        assert_eq!(ctx.settings.api.base_url, "https://override.example");
        assert!(ctx.authenticated().is_err());
    }
}
