use crate::domain::notice::Notice;
use crate::domain::ports::Notifier;
use crate::error::NotifyError;
use async_trait::async_trait;
use tracing::info;

/// Delivers notices by writing them to the log.
///
/// Stands in for the mailer; the rendered subject and body are what an email would carry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let to = notice.recipient();
        info!(
            account = %to.account_id,
            email = %to.email,
            subject = %notice.subject(),
            "{}",
            notice.body()
        );
        Ok(())
    }
}
