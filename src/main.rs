use habit_console::console::{Command, HELP, identifier_for};
use habit_console::ui::TextRenderer;
use habit_console::{
    ClientConfig, ClientError, ListController, Notice, RenderAdapter, ResourceClient, ResourceKind,
    Session, Startup,
};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

struct Console {
    config: ClientConfig,
    session: Session,
    kind: ResourceKind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let kind: ResourceKind = env::args()
        .nth(1)
        .unwrap_or_else(|| "habits".to_string())
        .parse()?;
    let config = ClientConfig::from_env()?;
    let session = Session::from_config(&config)?;
    let console = Console {
        config,
        session,
        kind,
    };

    Startup::<Console>::new()
        .add("announce", |ctx| async move {
            info!(
                api = %ctx.config.base_url,
                resource = %ctx.kind,
                scheme = ?ctx.config.id_scheme,
                "starting console"
            );
            Ok(())
        })
        .add("login", |ctx| async move {
            if let Some(creds) = &ctx.config.login {
                ctx.session.login(&creds.email, &creds.password).await?;
            }
            Ok(())
        })
        .add("auth check", |ctx| async move {
            if ctx.kind.requires_auth() && !ctx.session.is_authenticated().await {
                warn!(resource = %ctx.kind, "no token held; admin endpoints will reject requests");
            }
            Ok(())
        })
        .run(&console)
        .await?;

    let scheme = console.config.id_scheme;
    let client = ResourceClient::for_kind(console.session.clone(), kind, scheme);
    let renderer = TextRenderer::new(kind, std::io::stdout());
    let mut controller = ListController::new(kind.to_string(), client, renderer);

    report(controller.refresh().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                controller.renderer_mut().notify(&Notice::failure(err.to_string()));
                continue;
            }
        };

        let outcome = match command {
            Command::Next => controller.next_page().await,
            Command::Prev => controller.prev_page().await,
            Command::Page(page) => controller.set_page(page).await,
            Command::Refresh => controller.refresh().await,
            Command::Filter(filter) => {
                let sort = controller.list().sort().to_string();
                controller.apply_filter_sort(filter, sort).await
            }
            Command::Sort(sort) => match kind.validate_sort(&sort) {
                Ok(()) => {
                    let filter = controller.list().filter().to_string();
                    controller.apply_filter_sort(filter, sort).await
                }
                Err(err) => rejected(&mut controller, err),
            },
            Command::Add(item) => match kind.validate(&item) {
                Ok(()) => controller.create_item(&item).await.map(|_| ()),
                Err(err) => rejected(&mut controller, err),
            },
            Command::Edit(raw, patch) => {
                if patch.fields().next().is_none() {
                    rejected(&mut controller, ClientError::validation("edit needs at least one field=value"))
                } else {
                    let id = identifier_for(&raw, scheme);
                    controller.update_item(&id, &patch).await
                }
            }
            Command::Delete(raw) => {
                let id = identifier_for(&raw, scheme);
                controller.delete_item(&id).await
            }
            Command::DeleteAll => controller.delete_all().await,
            Command::Login { email, password } => {
                let outcome = console.session.login(&email, &password).await;
                acknowledge(&mut controller, outcome)
            }
            Command::Logout => {
                let outcome = console.session.logout().await.map(|()| "Logged out".to_string());
                acknowledge(&mut controller, outcome)
            }
            Command::Register {
                name,
                email,
                password,
            } => {
                let outcome = console.session.register(&name, &email, &password).await;
                acknowledge(&mut controller, outcome)
            }
            Command::Verify { email, code } => {
                let outcome = console.session.verify_email(&email, &code).await;
                acknowledge(&mut controller, outcome)
            }
            Command::Profile => {
                let outcome = console
                    .session
                    .profile()
                    .await
                    .map(|profile| format!("{} <{}> (user {})", profile.name, profile.email, profile.user_id));
                acknowledge(&mut controller, outcome)
            }
            Command::ChangePassword { old, new } => {
                let outcome = console.session.change_password(&old, &new).await;
                acknowledge(&mut controller, outcome)
            }
            Command::Help => {
                controller.renderer_mut().notify(&Notice::success(HELP));
                Ok(())
            }
            Command::Quit => break,
        };
        report(outcome);
    }

    Ok(())
}

/// Shows the backend's message for an account call, or its error.
fn acknowledge<R: RenderAdapter>(
    controller: &mut ListController<ResourceClient, R>,
    outcome: habit_console::Result<String>,
) -> habit_console::Result<()> {
    match outcome {
        Ok(message) => {
            controller.renderer_mut().notify(&Notice::success(message));
            Ok(())
        }
        Err(err) => rejected(controller, err),
    }
}

/// Surfaces an error raised outside the controller the same way the controller does.
fn rejected<R: RenderAdapter>(
    controller: &mut ListController<ResourceClient, R>,
    err: ClientError,
) -> habit_console::Result<()> {
    controller.renderer_mut().notify(&Notice::failure(err.to_string()));
    Err(err)
}

// Controller failures were already shown to the user.
fn report(outcome: habit_console::Result<()>) {
    if let Err(err) = outcome {
        debug!("command failed: {err}");
    }
}
