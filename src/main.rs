use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use workshop_orders::{
    build_router,
    config::{DatabaseConfig, EnvironmentConfig},
    database::DatabaseConnection,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🔧 Workshop Orders - Backend del taller");
    info!("========================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    let database_config = DatabaseConfig::from_env().context("Configuración de base de datos inválida")?;
    info!("🌍 Entorno: {}", config.environment);

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::connect(&database_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(e);
        }
    };
    db_connection.run_migrations().await?;

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let app_state = AppState::new(db_connection.pool().clone(), config);
    let app = build_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("👤 Clientes / 🚗 Vehículos / 🔩 Repuestos (requieren token):");
    info!("   CRUD /api/customers, /api/vehicles");
    info!("   POST /api/parts, POST /api/parts/:id/stock/add|remove");
    info!("🧾 Órdenes de servicio (requieren token):");
    info!("   POST /api/service-orders - Abrir orden");
    info!("   GET  /api/service-orders - Listar órdenes");
    info!("   GET  /api/service-orders/:id - Obtener orden");
    info!("   GET  /api/service-orders/number/:order_number - Buscar por número");
    info!("   POST /api/service-orders/:id/status - Cambiar estado");
    info!("   POST /api/service-orders/:id/approve - Aprobación del cliente");
    info!("   POST|DELETE /api/service-orders/:id/services, /parts - Líneas");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
