pub struct SmtpCredentials {
    pub user: String,
    pub password: String,
}
