//! Lit Action source used for the custom-auth flow. The action runs on the
//! nodes during session key signing: it resolves the PKP token id from the
//! public key passed in jsParams, lists the auth methods permitted for that
//! token on-chain, and approves the session iff the expected (type, id) pair
//! is among them.

use crate::types::CustomAuthMethod;

pub fn custom_auth_action(auth_method: &CustomAuthMethod) -> String {
    format!(
        r#"(async () => {{
    const tokenId = await Lit.Actions.pubkeyToTokenId({{ publicKey: pkpPublicKey }});
    const permittedAuthMethods = await Lit.Actions.getPermittedAuthMethods({{ tokenId }});
    const isPermitted = permittedAuthMethods.some((permittedAuthMethod) => {{
        if (permittedAuthMethod["auth_method_type"] === "{auth_method_type}" &&
            permittedAuthMethod["id"] === customAuthMethod.authMethodId) {{
            return true;
        }}
        return false;
    }});
    LitActions.setResponse({{ response: isPermitted ? "true" : "false" }});
}})();"#,
        auth_method_type = auth_method.hex_type(),
    )
}

/// jsParams handed to the action alongside the session key signing request.
/// The auth method type and id are rendered as 0x-prefixed hex, matching what
/// `getPermittedAuthMethods` returns on-node.
pub fn custom_auth_js_params(
    pkp_public_key: &str,
    auth_method: &CustomAuthMethod,
    sig_name: &str,
) -> serde_json::Value {
    serde_json::json!({
        "pkpPublicKey": pkp_public_key,
        "customAuthMethod": {
            "authMethodType": auth_method.hex_type(),
            "authMethodId": auth_method.hex_id(),
        },
        "sigName": sig_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_auth_method() -> CustomAuthMethod {
        CustomAuthMethod {
            auth_method_type: 89989,
            auth_method_id: "app-id-xxx:user-id-yyy".to_string(),
        }
    }

    #[test]
    fn action_embeds_hex_auth_method_type() {
        let source = custom_auth_action(&demo_auth_method());
        assert!(source.contains(r#""0x15f85""#));
        assert!(source.contains("pubkeyToTokenId"));
        assert!(source.contains("getPermittedAuthMethods"));
        assert!(source.contains("customAuthMethod.authMethodId"));
    }

    #[test]
    fn js_params_hex_encodes_type_and_id() {
        let params = custom_auth_js_params("0x04deadbeef", &demo_auth_method(), "custom-auth-sig");
        assert_eq!(params["pkpPublicKey"], "0x04deadbeef");
        assert_eq!(params["customAuthMethod"]["authMethodType"], "0x15f85");
        assert_eq!(
            params["customAuthMethod"]["authMethodId"],
            format!("0x{}", hex::encode("app-id-xxx:user-id-yyy"))
        );
        assert_eq!(params["sigName"], "custom-auth-sig");
    }
}
