use crate::{
    auth::{AuthUser, Role},
    db::DbPool,
    entities::company::Entity as CompanyEntity,
    entities::customer::Entity as CustomerEntity,
    entities::employee::Entity as EmployeeEntity,
    entities::message::{
        self, ActiveModel as MessageActiveModel, Audience, Entity as MessageEntity,
        Model as MessageModel,
    },
    errors::ServiceError,
    events::{Event, EventSender, MessageHub, MessageNotice},
};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use sea_orm::ActiveModelTrait;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub audience: Audience,
    /// Required when audience is direct
    pub recipient_id: Option<Uuid>,
    #[validate(length(min = 1, max = 4000, message = "Message body is required"))]
    pub body: String,
}

/// Message joined with the sender's display name.
#[derive(Debug, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: MessageModel,
    pub sender_name: String,
}

/// Service for internal messaging between the owner, staff, companies
/// and customers. Broadcast audiences fan out over the message hub.
#[derive(Clone)]
pub struct MessageService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    hub: MessageHub,
}

impl MessageService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        hub: MessageHub,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            hub,
        }
    }

    /// Posts a message from the authenticated sender. The owner may address
    /// any broadcast audience and managers may address their salesmen;
    /// everyone else sends direct messages.
    #[instrument(skip(self, request), fields(sender = %sender.user_id, audience = %request.audience))]
    pub async fn send_message(
        &self,
        sender: &AuthUser,
        request: SendMessageRequest,
    ) -> Result<MessageModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        match request.audience {
            Audience::Direct => {
                if request.recipient_id.is_none() {
                    return Err(ServiceError::BadRequest(
                        "Direct messages require a recipient".to_string(),
                    ));
                }
            }
            audience => {
                let allowed = sender.role == Role::Owner
                    || (sender.role == Role::Manager && audience == Audience::AllSalesmen);
                if !allowed {
                    return Err(ServiceError::Forbidden(
                        "Not allowed to send to this audience".to_string(),
                    ));
                }
                if request.recipient_id.is_some() {
                    return Err(ServiceError::BadRequest(
                        "Broadcast messages cannot have a recipient".to_string(),
                    ));
                }
            }
        }

        let message_id = Uuid::new_v4();
        let now = Utc::now();
        let model = MessageActiveModel {
            id: Set(message_id),
            sender_id: Set(sender.user_id),
            sender_role: Set(sender.role.to_string()),
            audience: Set(request.audience.to_string()),
            recipient_id: Set(request.recipient_id),
            body: Set(request.body),
            sent_at: Set(now.into()),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(message_id = %message_id, audience = %model.audience, "Message posted");

        let delivered = self.hub.publish(MessageNotice {
            id: model.id,
            sender_id: model.sender_id,
            sender_name: sender.name.clone(),
            sender_role: model.sender_role.clone(),
            audience: model.audience.clone(),
            recipient_id: model.recipient_id,
            body: model.body.clone(),
            sent_at: now,
        });
        tracing::debug!(message_id = %message_id, subscribers = delivered, "Message pushed to hub");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MessagePosted {
                    message_id,
                    audience: model.audience.clone(),
                })
                .await
            {
                warn!(error = %e, "Failed to send message posted event");
            }
        }

        Ok(model)
    }

    /// Messages visible to the given user: their direct traffic plus the
    /// broadcast audiences their role belongs to.
    #[instrument(skip(self), fields(user = %user.user_id))]
    pub async fn inbox(&self, user: &AuthUser) -> Result<Vec<MessageView>, ServiceError> {
        let mut condition = Condition::any()
            .add(message::Column::RecipientId.eq(user.user_id))
            .add(message::Column::SenderId.eq(user.user_id));

        for audience in broadcast_audiences_for(user.role) {
            condition = condition.add(message::Column::Audience.eq(audience.to_string()));
        }

        let messages = MessageEntity::find()
            .filter(condition)
            .order_by_desc(message::Column::SentAt)
            .all(&*self.db_pool)
            .await?;

        self.with_sender_names(messages).await
    }

    /// Resolves sender display names in one batch per principal table.
    async fn with_sender_names(
        &self,
        messages: Vec<MessageModel>,
    ) -> Result<Vec<MessageView>, ServiceError> {
        let db = &*self.db_pool;
        let mut names: HashMap<Uuid, String> = HashMap::new();

        let staff_ids: Vec<Uuid> = messages
            .iter()
            .filter(|m| m.sender_role == "manager" || m.sender_role == "salesman")
            .map(|m| m.sender_id)
            .collect();
        if !staff_ids.is_empty() {
            for e in EmployeeEntity::find()
                .filter(crate::entities::employee::Column::Id.is_in(staff_ids))
                .all(db)
                .await?
            {
                names.insert(e.id, e.name);
            }
        }

        let company_ids: Vec<Uuid> = messages
            .iter()
            .filter(|m| m.sender_role == "company")
            .map(|m| m.sender_id)
            .collect();
        if !company_ids.is_empty() {
            for c in CompanyEntity::find()
                .filter(crate::entities::company::Column::Id.is_in(company_ids))
                .all(db)
                .await?
            {
                names.insert(c.id, c.name);
            }
        }

        let customer_ids: Vec<Uuid> = messages
            .iter()
            .filter(|m| m.sender_role == "customer")
            .map(|m| m.sender_id)
            .collect();
        if !customer_ids.is_empty() {
            for c in CustomerEntity::find()
                .filter(crate::entities::customer::Column::Id.is_in(customer_ids))
                .all(db)
                .await?
            {
                names.insert(c.id, c.name);
            }
        }

        Ok(messages
            .into_iter()
            .map(|m| {
                let sender_name = if m.sender_role == "owner" {
                    "Owner".to_string()
                } else {
                    names
                        .get(&m.sender_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_string())
                };
                MessageView {
                    message: m,
                    sender_name,
                }
            })
            .collect())
    }

    pub fn hub(&self) -> &MessageHub {
        &self.hub
    }
}

/// Broadcast audiences a role is subscribed to.
pub fn broadcast_audiences_for(role: Role) -> Vec<Audience> {
    match role {
        Role::Owner => vec![
            Audience::AllSalesmen,
            Audience::AllManagers,
            Audience::AllStaff,
        ],
        Role::Manager => vec![Audience::AllManagers, Audience::AllStaff],
        Role::Salesman => vec![Audience::AllSalesmen, Audience::AllStaff],
        Role::Company | Role::Customer => vec![],
    }
}
