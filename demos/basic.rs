//! Basic example using an SQLite session database

use salvo::prelude::*;
use salvo_sql_session::{SessionDepotExt, SqlSessionHandler, SqlStore, SqliteDatabase, StoreConfig};

#[handler]
async fn index(depot: &mut Depot) -> String {
    let session = depot.session_mut().expect("Session not found");

    // Get current view count
    let views: i32 = session.get("views").unwrap_or(0);

    // Increment view count
    if let Err(e) = session.set("views", views + 1) {
        return format!("Could not update session: {}", e);
    }

    format!(
        "Hello! You have viewed this page {} time(s).\nSession ID: {}",
        views + 1,
        if session.id().is_empty() { "(assigned on save)" } else { session.id() }
    )
}

#[handler]
async fn get_user(depot: &mut Depot) -> String {
    let session = depot.session().expect("Session not found");

    match session.get::<String>("user") {
        Some(user) => format!("Logged in as: {}", user),
        None => "Not logged in".to_string(),
    }
}

#[handler]
async fn set_user(req: &mut Request, depot: &mut Depot) -> String {
    let session = depot.session_mut().expect("Session not found");

    // Get username from query parameter
    let username = req.query::<String>("name").unwrap_or_else(|| "anonymous".to_string());

    match session.set("user", &username) {
        Ok(()) => format!("User set to: {}", username),
        Err(e) => format!("Could not update session: {}", e),
    }
}

#[handler]
async fn logout(depot: &mut Depot) -> &'static str {
    let session = depot.session_mut().expect("Session not found");

    // Clear all session data, keep the session
    session.clear();

    "Logged out successfully"
}

#[handler]
async fn destroy_session(depot: &mut Depot) -> &'static str {
    let session = depot.session_mut().expect("Session not found");

    // Delete the row and the cookie on save
    session.destroy();

    "Session destroyed"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    tracing_subscriber::fmt::init();

    let db = SqliteDatabase::connect("sqlite://sessions.db?mode=rwc").await?;
    sqlx::query(SqliteDatabase::SCHEMA).execute(db.pool()).await?;

    let config = StoreConfig::with_keys(["your-super-secret-key-change-in-production", "previous-key"])
        .with_max_age(3600) // 1 hour
        .with_operation_timeout(std::time::Duration::from_secs(5));
    let store = SqlStore::new(db, config)?;

    // Drop stale rows once at startup
    let removed = store.purge_expired().await?;
    tracing::info!(removed, "Purged expired sessions");

    let session_handler = SqlSessionHandler::new(store).with_cookie_name("sid");

    // Build router
    let router = Router::new()
        .hoop(session_handler)
        .get(index)
        .push(Router::with_path("user").get(get_user))
        .push(Router::with_path("login").get(set_user))
        .push(Router::with_path("logout").get(logout))
        .push(Router::with_path("destroy").get(destroy_session));

    // Start server
    let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
    println!("Server running at http://127.0.0.1:5800");
    println!("Try these endpoints:");
    println!("  GET /           - View counter");
    println!("  GET /user       - Get current user");
    println!("  GET /login?name=alice - Set user");
    println!("  GET /logout     - Clear session");
    println!("  GET /destroy    - Destroy session");

    Server::new(acceptor).serve(router).await;
    Ok(())
}

