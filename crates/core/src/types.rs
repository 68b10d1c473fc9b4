/// Opaque user identifier: the document id under `users/`.
pub type Uid = String;

/// Opaque alert identifier: the document id under `users/{uid}/alerts/`.
pub type AlertId = String;
