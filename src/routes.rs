use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("per_ms and burst are non-zero");
        Governor::new(&cfg)
    }

    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));
    let sync_limiter = Arc::new(build_limiter(config.rate_sync_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("/health").route(web::get().to(attendance::health)))
            .service(
                web::scope("/attendance")
                    // /attendance?start=&end=
                    .service(
                        web::resource("")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(attendance::get_attendance)),
                    )
                    // /attendance/sync?set=A|B
                    .service(
                        web::resource("/sync")
                            .wrap(sync_limiter)
                            .route(web::post().to(attendance::run_sync)),
                    ),
            )
            .service(
                web::resource("/users")
                    .wrap(read_limiter)
                    .route(web::get().to(attendance::list_users)),
            ),
    );
}
