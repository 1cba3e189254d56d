//! Validation RPC (C12), §4.12: a thin tonic shim over
//! [`auth_oauth::ValidationService`]'s introspect-then-scope-check logic. This
//! crate owns the wire contract only; every decision about whether a token is
//! valid lives in `auth-oauth`.

use std::net::SocketAddr;
use std::sync::Arc;

use tonic::{transport::Server, Request, Response, Status};
use tracing::info;

use auth_oauth::ValidationService;

pub mod proto {
    tonic::include_proto!("identity.validation.v1");
}

use proto::token_validation_service_server::{
    TokenValidationService, TokenValidationServiceServer,
};
use proto::{
    TokenInfo as ProtoTokenInfo, UserInfo as ProtoUserInfo,
    ValidateTokenRequest as ProtoRequest, ValidateTokenResponse as ProtoResponse,
};

pub struct ValidationGrpcService {
    validation: Arc<ValidationService>,
}

impl ValidationGrpcService {
    pub fn new(validation: Arc<ValidationService>) -> Self {
        Self { validation }
    }
}

#[tonic::async_trait]
impl TokenValidationService for ValidationGrpcService {
    async fn validate_token(
        &self,
        request: Request<ProtoRequest>,
    ) -> Result<Response<ProtoResponse>, Status> {
        let req = request.into_inner();
        let domain_request = auth_oauth::models::ValidateTokenRequest {
            token: req.token,
            token_type: req.token_type,
            required_scopes: req.required_scopes,
        };

        let response = self.validation.validate(&domain_request).await;
        Ok(Response::new(to_proto(response)))
    }
}

fn to_proto(response: auth_oauth::models::ValidateTokenResponse) -> ProtoResponse {
    ProtoResponse {
        valid: response.valid,
        error: response.error,
        token_info: response.token_info.map(|info| ProtoTokenInfo {
            active: info.active,
            token_type: info.token_type,
            scope: info.scope,
            client_id: info.client_id,
            audience: info.audience,
            issuer: info.issuer,
            subject: info.subject,
            expires_at: info.expires_at.map(|t| t.timestamp()),
            issued_at: info.issued_at.timestamp(),
        }),
        user_info: response.user_info.map(|user| ProtoUserInfo {
            subject: user.subject,
            username: user.username,
            email: user.email,
            name: user.name,
            email_verified: user.email_verified,
            updated_at: user.updated_at.map(|t| t.timestamp()),
            extra: user
                .extra
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            tenant_id: user.tenant_id,
        }),
    }
}

/// Starts the validation gRPC server, registering it with the standard gRPC
/// health-check service (`grpc.health.v1.Health`).
pub async fn serve(addr: SocketAddr, validation: Arc<ValidationService>) -> anyhow::Result<()> {
    let service = ValidationGrpcService::new(validation);

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<TokenValidationServiceServer<ValidationGrpcService>>()
        .await;

    info!(%addr, "starting validation gRPC server");

    Server::builder()
        .add_service(health_service)
        .add_service(TokenValidationServiceServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}
