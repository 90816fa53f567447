use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use yalors::{
    application::{
        blog::BlogService,
        chat::ChatService,
        contact::{ContactService, SubmissionLog},
        error::AppError,
    },
    config,
    domain::{chat::ChatSession, posts::CategoryFilter},
    infra::{
        content,
        error::InfraError,
        http::{self, HttpState},
        mailer,
        submissions::JsonFileSubmissionLog,
        telemetry,
        webhook::HttpChatWebhook,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Posts(args) => run_posts(settings, args),
        config::Command::Submissions(_) => run_submissions(settings).await,
        config::Command::Chat(args) => run_chat(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let catalog = content::load_catalog(&settings.content)?;
    let mailer = mailer::from_settings(&settings.contact)?;
    let submission_log = Arc::new(JsonFileSubmissionLog::new(
        settings.contact.log_path.clone(),
    ));
    let webhook = Arc::new(HttpChatWebhook::new(&settings.chat)?);

    let state = HttpState {
        blog: Arc::new(BlogService::new(catalog)),
        contact: Arc::new(ContactService::new(
            mailer,
            submission_log,
            settings.contact.strict_validation,
        )),
        chat: Arc::new(ChatService::new(webhook)),
    };

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "yalors::serve",
        addr = %settings.server.addr,
        submissions = %settings.contact.log_path.display(),
        chat_webhook = %settings.chat.webhook_url,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "yalors::serve", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "yalors::serve", error = %err, "failed to listen for shutdown signal");
    }
}

fn run_posts(settings: config::Settings, args: config::PostsArgs) -> Result<(), AppError> {
    let catalog = content::load_catalog(&settings.content)?;
    let blog = BlogService::new(catalog);

    let posts = if args.featured {
        blog.featured()
    } else {
        blog.list(
            args.search.as_deref().unwrap_or(""),
            &CategoryFilter::from_param(args.category.as_deref()),
        )
    };

    for post in &posts {
        println!(
            "{:>3}  {:<48}  {:<14}  {}",
            post.id, post.slug, post.category, post.date
        );
    }
    info!(target = "yalors::posts", count = posts.len(), "listed posts");
    Ok(())
}

async fn run_submissions(settings: config::Settings) -> Result<(), AppError> {
    let log = JsonFileSubmissionLog::new(settings.contact.log_path.clone());
    let entries = log.list().await?;
    let rendered = serde_json::to_string_pretty(&entries)
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    println!("{rendered}");
    Ok(())
}

async fn run_chat(settings: config::Settings, args: config::ChatArgs) -> Result<(), AppError> {
    let webhook = Arc::new(HttpChatWebhook::new(&settings.chat)?);
    let chat = ChatService::new(webhook);

    let session = match args.session {
        Some(id) => ChatSession::from_existing(id),
        None => ChatSession::generate(),
    };

    let reply = chat.ask(&session, &args.message).await?;
    info!(target = "yalors::chat", session = session.as_str(), "reply received");
    println!("{reply}");
    Ok(())
}
