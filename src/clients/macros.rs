/// Generates the methods every typed store client shares: refetch, delete,
/// snapshot access and shutdown. Errors are mapped through the client's own
/// error type's `From<FrameworkError>`.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident, $plural:ident) => {
        paste::paste! {
            impl $client_name {
                /// Replace the local list with the store's current contents.
                #[tracing::instrument(skip(self))]
                pub async fn fetch_all(&self) -> Result<$crate::actor_framework::FetchOutcome, $error> {
                    tracing::debug!("Sending request");
                    self.inner.fetch().await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, id: String) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id).await.map_err(<$error>::from)
                }

                /// Current list, newest first.
                pub fn $plural(&self) -> $crate::actor_framework::Snapshot<$entity> {
                    self.inner.snapshot()
                }

                pub fn [<find_ $entity_name_snake>](&self, id: &str) -> Option<$entity> {
                    use $crate::actor_framework::Record;
                    self.inner.snapshot().iter().find(|item| item.id() == id).cloned()
                }

                pub fn watch(&self) -> tokio::sync::watch::Receiver<$crate::actor_framework::Snapshot<$entity>> {
                    self.inner.watch()
                }

                pub async fn shutdown(&self) -> Result<(), $error> {
                    self.inner.shutdown().await.map_err(<$error>::from)
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident, $plural:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $error, $entity_name_snake, $plural);
    };
}
